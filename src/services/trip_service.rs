// src/services/trip_service.rs

use serde_json::json;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{field_error, AppError},
    db::{AuditRepository, BookingRepository, TripRepository},
    models::{
        audit::AuditAction,
        profile::Session,
        trip::{Trip, TripDetail, TripPayload},
    },
    services::filters::{RecordFilter, TripFilter},
};

#[derive(Clone)]
pub struct TripService {
    repo: TripRepository,
    booking_repo: BookingRepository,
    audit: AuditRepository,
}

impl TripService {
    pub fn new(repo: TripRepository, booking_repo: BookingRepository, audit: AuditRepository) -> Self {
        Self { repo, booking_repo, audit }
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &TripFilter) -> Result<Vec<Trip>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let trips = self.repo.list(executor).await?;
        Ok(filter.apply(trips))
    }

    pub async fn get_detail(&self, conn: &mut PgConnection, id: Uuid) -> Result<TripDetail, AppError> {
        let trip = self
            .repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Trip".into()))?;
        let bookings = self.booking_repo.list_by_trip(conn, id).await?;

        Ok(TripDetail { trip, bookings })
    }

    pub async fn create<'c, A>(&self, executor: A, session: &Session, input: &TripPayload) -> Result<Trip, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        check_dates(input)?;

        // Sem agente informado, a viagem fica com quem a criou
        let agent_id = input.agent_id.unwrap_or(session.profile_id);

        let mut tx = executor.begin().await?;

        let id = self.repo.insert(&mut *tx, input, Some(agent_id)).await?;
        self.repo.set_clients(&mut *tx, id, &input.client_ids).await?;
        self.repo.set_location_tags(&mut *tx, id, &input.location_tag_ids).await?;

        let trip = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Trip".into()))?;

        self.audit
            .record(&mut *tx, "trips", id, AuditAction::Insert, session.profile_id, json!(trip))
            .await?;

        tx.commit().await?;

        tracing::info!(trip_id = %id, agent_id = %agent_id, "Viagem criada");
        Ok(trip)
    }

    pub async fn update<'c, A>(
        &self,
        executor: A,
        session: &Session,
        id: Uuid,
        input: &TripPayload,
    ) -> Result<Trip, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        check_dates(input)?;

        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Trip".into()))?;

        // Agente omitido na edição mantém o atual
        let agent_id = input.agent_id.or(current.agent_id);

        self.repo.update(&mut *tx, id, input, agent_id).await?;
        self.repo.set_clients(&mut *tx, id, &input.client_ids).await?;
        self.repo.set_location_tags(&mut *tx, id, &input.location_tag_ids).await?;

        let trip = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Trip".into()))?;

        self.audit
            .record(&mut *tx, "trips", id, AuditAction::Update, session.profile_id, json!(trip))
            .await?;

        tx.commit().await?;
        Ok(trip)
    }

    pub async fn delete<'c, A>(&self, executor: A, session: &Session, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let trip = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Trip".into()))?;

        self.repo.delete(&mut *tx, id).await?;
        self.audit
            .record(&mut *tx, "trips", id, AuditAction::Delete, session.profile_id, json!(trip))
            .await?;

        tx.commit().await?;

        tracing::info!(trip_id = %id, "Viagem removida");
        Ok(())
    }
}

fn check_dates(input: &TripPayload) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(field_error("endDate", "end_before_start"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn payload(start: Option<NaiveDate>, end: Option<NaiveDate>) -> TripPayload {
        TripPayload {
            name: "Lua de mel".into(),
            status: None,
            start_date: start,
            end_date: end,
            high_priority: false,
            client_ids: vec![],
            location_tag_ids: vec![],
            agent_id: None,
            notes: None,
        }
    }

    #[test]
    fn open_ended_trips_are_accepted() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 10);
        assert!(check_dates(&payload(d, None)).is_ok());
        assert!(check_dates(&payload(None, d)).is_ok());
        assert!(check_dates(&payload(d, d)).is_ok());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 10);
        let end = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert!(matches!(check_dates(&payload(start, end)), Err(AppError::ValidationError(_))));
    }
}
