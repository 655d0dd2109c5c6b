// src/services/booking_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{field_error, AppError},
    db::{AuditRepository, BookingRepository, ReferenceRepository, VendorRepository},
    models::{
        audit::AuditAction,
        booking::{
            Booking, BookingPayload, BookingPreview, BookingPreviewPayload, BookingStatus,
            CommissionStatus, NewBooking, UpdateBookingStatusPayload,
        },
        profile::Session,
    },
    services::{
        commission::{display_commission, BookingDraft, VendorRateSource},
        filters::{BookingFilter, RecordFilter},
    },
};

#[derive(Clone)]
pub struct BookingService {
    repo: BookingRepository,
    vendor_repo: VendorRepository,
    reference_repo: ReferenceRepository,
    audit: AuditRepository,
}

impl BookingService {
    pub fn new(
        repo: BookingRepository,
        vendor_repo: VendorRepository,
        reference_repo: ReferenceRepository,
        audit: AuditRepository,
    ) -> Self {
        Self { repo, vendor_repo, reference_repo, audit }
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &BookingFilter) -> Result<Vec<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bookings = self.repo.list(executor).await?;
        Ok(filter.apply(bookings))
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Booking".into()))
    }

    /// Roda a cascata do formulário sem gravar nada.
    pub async fn preview(&self, conn: &mut PgConnection, input: &BookingPreviewPayload) -> Result<BookingPreview, AppError> {
        if input.cost < Decimal::ZERO {
            return Err(field_error("cost", "must_not_be_negative"));
        }

        let all_service_types = self.reference_repo.list_service_type_ids(&mut *conn).await?;
        let mut draft = BookingDraft::new(all_service_types);

        if let Some(vendor_id) = input.vendor_id {
            draft.on_vendor_selected(&mut self.vendor_repo.rates(conn), vendor_id).await?;
        }
        if let Some(service_type_id) = input.service_type_id {
            draft.select_service_type(service_type_id)?;
        }
        draft.set_cost(input.cost);

        Ok(draft.preview())
    }

    pub async fn create<'c, A>(&self, executor: A, session: &Session, input: &BookingPayload) -> Result<Booking, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let all_service_types = self.reference_repo.list_service_type_ids(&mut *tx).await?;
        let new_booking = derive_booking(&mut self.vendor_repo.rates(&mut *tx), all_service_types, input).await?;

        let id = self.repo.insert(&mut *tx, &new_booking).await?;
        self.repo.set_clients(&mut *tx, id, &new_booking.client_ids).await?;

        let booking = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Booking".into()))?;

        self.audit
            .record(&mut *tx, "bookings", id, AuditAction::Insert, session.profile_id, json!(booking))
            .await?;

        tx.commit().await?;

        tracing::info!(booking_id = %id, commission = %display_commission(booking.commission_amount), "Reserva criada");
        Ok(booking)
    }

    pub async fn update<'c, A>(
        &self,
        executor: A,
        session: &Session,
        id: Uuid,
        input: &BookingPayload,
    ) -> Result<Booking, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let all_service_types = self.reference_repo.list_service_type_ids(&mut *tx).await?;
        let new_booking = derive_booking(&mut self.vendor_repo.rates(&mut *tx), all_service_types, input).await?;

        if !self.repo.update(&mut *tx, id, &new_booking).await? {
            return Err(AppError::ResourceNotFound("Booking".into()));
        }
        self.repo.set_clients(&mut *tx, id, &new_booking.client_ids).await?;

        let booking = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Booking".into()))?;

        self.audit
            .record(&mut *tx, "bookings", id, AuditAction::Update, session.profile_id, json!(booking))
            .await?;

        tx.commit().await?;
        Ok(booking)
    }

    pub async fn update_status<'c, A>(
        &self,
        executor: A,
        session: &Session,
        id: Uuid,
        input: &UpdateBookingStatusPayload,
    ) -> Result<Booking, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if !self.repo.update_status(&mut *tx, id, input).await? {
            return Err(AppError::ResourceNotFound("Booking".into()));
        }

        let booking = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Booking".into()))?;

        self.audit
            .record(
                &mut *tx,
                "bookings",
                id,
                AuditAction::Update,
                session.profile_id,
                json!({
                    "bookingStatus": booking.booking_status,
                    "commissionStatus": booking.commission_status,
                    "isCompleted": booking.is_completed,
                }),
            )
            .await?;

        tx.commit().await?;
        Ok(booking)
    }

    pub async fn delete<'c, A>(&self, executor: A, session: &Session, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let booking = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Booking".into()))?;

        self.repo.delete(&mut *tx, id).await?;
        self.audit
            .record(&mut *tx, "bookings", id, AuditAction::Delete, session.profile_id, json!(booking))
            .await?;

        tx.commit().await?;

        tracing::info!(booking_id = %id, "Reserva removida");
        Ok(())
    }
}

/// Monta a reserva a gravar: taxa e valor da comissão vêm sempre do fornecedor,
/// nunca do payload.
async fn derive_booking<S>(
    rates: &mut S,
    all_service_types: Vec<Uuid>,
    input: &BookingPayload,
) -> Result<NewBooking, AppError>
where
    S: VendorRateSource + ?Sized,
{
    if input.cost < Decimal::ZERO {
        return Err(field_error("cost", "must_not_be_negative"));
    }
    if input.end_date.is_some_and(|end| end < input.start_date) {
        return Err(field_error("endDate", "end_before_start"));
    }

    let mut draft = BookingDraft::new(all_service_types);
    draft.on_vendor_selected(rates, input.vendor_id).await?;
    draft.select_service_type(input.service_type_id)?;
    draft.set_cost(input.cost);

    Ok(NewBooking {
        client_ids: input.client_ids.clone(),
        vendor_id: input.vendor_id,
        service_type_id: input.service_type_id,
        trip_id: input.trip_id,
        start_date: input.start_date,
        end_date: input.end_date,
        location: input.location.clone(),
        cost: draft.cost(),
        commission_rate: draft.commission_rate(),
        commission_amount: draft.commission_amount(),
        booking_status: input.booking_status.unwrap_or(BookingStatus::Pending),
        commission_status: input.commission_status.unwrap_or(CommissionStatus::Unreceived),
        is_completed: input.is_completed,
        notes: input.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::str::FromStr;

    use crate::models::vendor::VendorRate;

    struct OneVendor(VendorRate);

    #[async_trait]
    impl VendorRateSource for OneVendor {
        async fn vendor_rate(&mut self, vendor_id: Uuid) -> Result<VendorRate, AppError> {
            if vendor_id == self.0.vendor_id {
                Ok(self.0.clone())
            } else {
                Err(AppError::ResourceNotFound("Vendor".into()))
            }
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn payload(vendor_id: Uuid, service_type_id: Uuid, cost: &str) -> BookingPayload {
        BookingPayload {
            client_ids: vec![Uuid::new_v4()],
            vendor_id,
            service_type_id,
            trip_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: None,
            location: None,
            cost: dec(cost),
            booking_status: None,
            commission_status: None,
            is_completed: false,
            notes: None,
        }
    }

    #[tokio::test]
    async fn derived_booking_uses_vendor_rate_and_exact_amount() {
        let hotel = Uuid::new_v4();
        let mut vendor = OneVendor(VendorRate {
            vendor_id: Uuid::new_v4(),
            commission_rate: dec("7.25"),
            service_type_ids: vec![hotel],
        });

        let input = payload(vendor.0.vendor_id, hotel, "250.5");
        let booking = derive_booking(&mut vendor, vec![hotel], &input)
            .await
            .unwrap();

        assert_eq!(booking.commission_rate, dec("7.25"));
        assert_eq!(booking.commission_amount, dec("18.16125"));
        assert_eq!(booking.booking_status, BookingStatus::Pending);
        assert_eq!(booking.commission_status, CommissionStatus::Unreceived);
    }

    #[tokio::test]
    async fn service_type_outside_vendor_offer_is_rejected() {
        let (hotel, tour) = (Uuid::new_v4(), Uuid::new_v4());
        let mut vendor = OneVendor(VendorRate {
            vendor_id: Uuid::new_v4(),
            commission_rate: dec("10"),
            service_type_ids: vec![hotel],
        });

        let input = payload(vendor.0.vendor_id, tour, "100");
        let result = derive_booking(&mut vendor, vec![hotel, tour], &input).await;

        assert!(matches!(result, Err(AppError::ServiceTypeNotOffered)));
    }

    #[tokio::test]
    async fn unknown_vendor_is_not_found() {
        let hotel = Uuid::new_v4();
        let mut vendor = OneVendor(VendorRate {
            vendor_id: Uuid::new_v4(),
            commission_rate: dec("10"),
            service_type_ids: vec![],
        });

        let result = derive_booking(&mut vendor, vec![hotel], &payload(Uuid::new_v4(), hotel, "100")).await;

        assert!(matches!(result, Err(AppError::ResourceNotFound(r)) if r == "Vendor"));
    }

    #[tokio::test]
    async fn negative_cost_and_inverted_dates_fail_validation() {
        let hotel = Uuid::new_v4();
        let mut vendor = OneVendor(VendorRate {
            vendor_id: Uuid::new_v4(),
            commission_rate: dec("10"),
            service_type_ids: vec![],
        });

        let negative = payload(vendor.0.vendor_id, hotel, "-1");
        assert!(matches!(
            derive_booking(&mut vendor, vec![hotel], &negative).await,
            Err(AppError::ValidationError(_))
        ));

        let mut inverted = payload(vendor.0.vendor_id, hotel, "100");
        inverted.end_date = NaiveDate::from_ymd_opt(2024, 5, 31);
        assert!(matches!(
            derive_booking(&mut vendor, vec![hotel], &inverted).await,
            Err(AppError::ValidationError(_))
        ));
    }

    struct CountingRates {
        inner: OneVendor,
        lookups: Vec<Uuid>,
    }

    #[async_trait]
    impl VendorRateSource for CountingRates {
        async fn vendor_rate(&mut self, vendor_id: Uuid) -> Result<VendorRate, AppError> {
            self.lookups.push(vendor_id);
            self.inner.vendor_rate(vendor_id).await
        }
    }

    #[tokio::test]
    async fn rate_is_read_once_through_the_given_source() {
        let hotel = Uuid::new_v4();
        let vendor_id = Uuid::new_v4();
        let mut rates = CountingRates {
            inner: OneVendor(VendorRate {
                vendor_id,
                commission_rate: dec("5"),
                service_type_ids: vec![hotel],
            }),
            lookups: vec![],
        };

        let booking = derive_booking(&mut rates, vec![hotel], &payload(vendor_id, hotel, "40"))
            .await
            .unwrap();

        assert_eq!(rates.lookups, vec![vendor_id]);
        assert_eq!(booking.commission_amount, dec("2"));
    }
}
