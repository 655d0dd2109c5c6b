// src/db/trip_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::replace_links, error::AppError},
    models::trip::{Trip, TripPayload, TripStatus},
};

const TRIP_SELECT: &str = r#"
    SELECT
        t.id, t.name, t.status, t.start_date, t.end_date, t.high_priority,
        COALESCE(
            (SELECT array_agg(c.id ORDER BY c.last_name, c.first_name)
             FROM trip_clients tc JOIN clients c ON c.id = tc.client_id
             WHERE tc.trip_id = t.id),
            '{}'::uuid[]
        ) AS client_ids,
        COALESCE(
            (SELECT array_agg(c.first_name || ' ' || c.last_name ORDER BY c.last_name, c.first_name)
             FROM trip_clients tc JOIN clients c ON c.id = tc.client_id
             WHERE tc.trip_id = t.id),
            '{}'::text[]
        ) AS client_names,
        COALESCE(
            (SELECT array_agg(tl.location_tag_id) FROM trip_location_tags tl WHERE tl.trip_id = t.id),
            '{}'::uuid[]
        ) AS location_tag_ids,
        t.agent_id, t.notes, t.created_at, t.updated_at
    FROM trips t
"#;

#[derive(Clone, Default)]
pub struct TripRepository;

impl TripRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Trip>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Prioritárias primeiro, depois as mais próximas
        let sql = format!(
            "{TRIP_SELECT} ORDER BY t.high_priority DESC, t.start_date ASC NULLS LAST, t.name ASC"
        );
        let trips = sqlx::query_as::<_, Trip>(&sql).fetch_all(executor).await?;

        Ok(trips)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Trip>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{TRIP_SELECT} WHERE t.id = $1");
        let trip = sqlx::query_as::<_, Trip>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(trip)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        input: &TripPayload,
        agent_id: Option<Uuid>,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO trips (name, status, start_date, end_date, high_priority, agent_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.status.unwrap_or(TripStatus::Planned))
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.high_priority)
        .bind(agent_id)
        .bind(&input.notes)
        .fetch_one(executor)
        .await
        .map_err(Self::map_agent_fk)?;

        Ok(id)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &TripPayload,
        agent_id: Option<Uuid>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE trips
            SET name = $2, status = COALESCE($3, status), start_date = $4, end_date = $5,
                high_priority = $6, agent_id = $7, notes = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.status)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.high_priority)
        .bind(agent_id)
        .bind(&input.notes)
        .execute(executor)
        .await
        .map_err(Self::map_agent_fk)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_clients<'e, E>(&self, executor: E, trip_id: Uuid, ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        replace_links(executor, "trip_clients", "trip_id", "client_id", trip_id, ids, "Client").await
    }

    pub async fn set_location_tags<'e, E>(&self, executor: E, trip_id: Uuid, ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        replace_links(executor, "trip_location_tags", "trip_id", "location_tag_id", trip_id, ids, "LocationTag").await
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Reservas da viagem ficam órfãs (trip_id = NULL)
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn map_agent_fk(e: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_foreign_key_violation() {
                return AppError::ResourceNotFound("Profile".into());
            }
        }
        e.into()
    }
}
