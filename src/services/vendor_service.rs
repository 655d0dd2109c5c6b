// src/services/vendor_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{field_error, AppError},
    db::{AuditRepository, ReferenceRepository, VendorRepository},
    models::{
        audit::AuditAction,
        booking::BookingPreview,
        profile::Session,
        vendor::{Vendor, VendorPayload},
    },
    services::{
        commission::BookingDraft,
        filters::{RecordFilter, VendorFilter},
    },
};

#[derive(Clone)]
pub struct VendorService {
    repo: VendorRepository,
    reference_repo: ReferenceRepository,
    audit: AuditRepository,
}

impl VendorService {
    pub fn new(repo: VendorRepository, reference_repo: ReferenceRepository, audit: AuditRepository) -> Self {
        Self { repo, reference_repo, audit }
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &VendorFilter) -> Result<Vec<Vendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vendors = self.repo.list(executor).await?;
        Ok(filter.apply(vendors))
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Vendor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Vendor".into()))
    }

    /// Resultado do evento "fornecedor selecionado" num formulário de reserva vazio:
    /// taxa do fornecedor e tipos de serviço que ele oferece.
    pub async fn booking_defaults(&self, conn: &mut PgConnection, vendor_id: Uuid) -> Result<BookingPreview, AppError> {
        let all_service_types = self.reference_repo.list_service_type_ids(&mut *conn).await?;

        let mut draft = BookingDraft::new(all_service_types);
        draft.on_vendor_selected(&mut self.repo.rates(conn), vendor_id).await?;

        Ok(draft.preview())
    }

    pub async fn create<'c, A>(&self, executor: A, session: &Session, input: &VendorPayload) -> Result<Vendor, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        check_vendor(input)?;

        let mut tx = executor.begin().await?;

        let id = self.repo.insert(&mut *tx, input).await?;
        self.repo.set_service_types(&mut *tx, id, &input.service_type_ids).await?;
        self.repo.set_tags(&mut *tx, id, &input.tag_ids).await?;

        let vendor = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Vendor".into()))?;

        self.audit
            .record(&mut *tx, "vendors", id, AuditAction::Insert, session.profile_id, json!(vendor))
            .await?;

        tx.commit().await?;

        tracing::info!(vendor_id = %id, "Fornecedor criado");
        Ok(vendor)
    }

    pub async fn update<'c, A>(
        &self,
        executor: A,
        session: &Session,
        id: Uuid,
        input: &VendorPayload,
    ) -> Result<Vendor, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        check_vendor(input)?;

        let mut tx = executor.begin().await?;

        if !self.repo.update(&mut *tx, id, input).await? {
            return Err(AppError::ResourceNotFound("Vendor".into()));
        }
        self.repo.set_service_types(&mut *tx, id, &input.service_type_ids).await?;
        self.repo.set_tags(&mut *tx, id, &input.tag_ids).await?;

        let vendor = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Vendor".into()))?;

        self.audit
            .record(&mut *tx, "vendors", id, AuditAction::Update, session.profile_id, json!(vendor))
            .await?;

        tx.commit().await?;
        Ok(vendor)
    }

    pub async fn delete<'c, A>(&self, executor: A, session: &Session, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let vendor = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Vendor".into()))?;

        self.repo.delete(&mut *tx, id).await?;
        self.audit
            .record(&mut *tx, "vendors", id, AuditAction::Delete, session.profile_id, json!(vendor))
            .await?;

        tx.commit().await?;

        tracing::info!(vendor_id = %id, "Fornecedor removido");
        Ok(())
    }
}

// Faixas numéricas que o `validator` não cobre para Decimal
fn check_vendor(input: &VendorPayload) -> Result<(), AppError> {
    if input.commission_rate < Decimal::ZERO || input.commission_rate > Decimal::ONE_HUNDRED {
        return Err(field_error("commissionRate", "out_of_range"));
    }
    if input.rating < Decimal::ZERO || input.rating > Decimal::from(5) {
        return Err(field_error("rating", "out_of_range"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(rate: i64, rating: i64) -> VendorPayload {
        VendorPayload {
            name: "Pousada Mar Azul".into(),
            contact_person: None,
            email: None,
            phone: None,
            address: None,
            service_area: None,
            commission_rate: Decimal::from(rate),
            price_range: 3,
            rating: Decimal::from(rating),
            service_type_ids: vec![],
            tag_ids: vec![],
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(check_vendor(&payload(0, 0)).is_ok());
        assert!(check_vendor(&payload(100, 5)).is_ok());
    }

    #[test]
    fn rate_above_hundred_or_rating_above_five_is_rejected() {
        assert!(matches!(check_vendor(&payload(101, 4)), Err(AppError::ValidationError(_))));
        assert!(matches!(check_vendor(&payload(10, 6)), Err(AppError::ValidationError(_))));
        assert!(matches!(check_vendor(&payload(-1, 4)), Err(AppError::ValidationError(_))));
    }
}
