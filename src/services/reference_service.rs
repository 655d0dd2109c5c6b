// src/services/reference_service.rs

use serde_json::json;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, ReferenceRepository},
    models::{
        audit::AuditAction,
        profile::Session,
        reference::{
            CreateLocationTagPayload, CreateServiceTypePayload, CreateTagPayload, ImportSummary,
            LocationTag, ServiceType, Tag,
        },
    },
    services::csv_import::{validate_csv, CsvRecord},
};

pub const LOCATION_TAG_REQUIRED_FIELDS: &[&str] = &["continent", "country"];

#[derive(Clone)]
pub struct ReferenceService {
    repo: ReferenceRepository,
    audit: AuditRepository,
}

impl ReferenceService {
    pub fn new(repo: ReferenceRepository, audit: AuditRepository) -> Self {
        Self { repo, audit }
    }

    // =========================================================================
    //  TIPOS DE SERVIÇO
    // =========================================================================

    pub async fn list_service_types<'e, E>(&self, executor: E) -> Result<Vec<ServiceType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_service_types(executor).await
    }

    pub async fn create_service_type<'c, A>(
        &self,
        executor: A,
        session: &Session,
        input: &CreateServiceTypePayload,
    ) -> Result<ServiceType, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let service_type = self.repo.create_service_type(&mut *tx, input).await?;
        self.audit
            .record(&mut *tx, "service_types", service_type.id, AuditAction::Insert, session.profile_id, json!(service_type))
            .await?;

        tx.commit().await?;
        Ok(service_type)
    }

    pub async fn delete_service_type<'c, A>(&self, executor: A, session: &Session, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if !self.repo.delete_service_type(&mut *tx, id).await? {
            return Err(AppError::ResourceNotFound("ServiceType".into()));
        }
        self.audit
            .record(&mut *tx, "service_types", id, AuditAction::Delete, session.profile_id, json!({}))
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  TAGS
    // =========================================================================

    pub async fn list_tags<'e, E>(&self, executor: E) -> Result<Vec<Tag>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_tags(executor).await
    }

    pub async fn create_tag<'c, A>(&self, executor: A, session: &Session, input: &CreateTagPayload) -> Result<Tag, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let tag = self.repo.create_tag(&mut *tx, input).await?;
        self.audit
            .record(&mut *tx, "tags", tag.id, AuditAction::Insert, session.profile_id, json!(tag))
            .await?;

        tx.commit().await?;
        Ok(tag)
    }

    pub async fn delete_tag<'c, A>(&self, executor: A, session: &Session, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if !self.repo.delete_tag(&mut *tx, id).await? {
            return Err(AppError::ResourceNotFound("Tag".into()));
        }
        self.audit
            .record(&mut *tx, "tags", id, AuditAction::Delete, session.profile_id, json!({}))
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  LOCALIZAÇÃO
    // =========================================================================

    pub async fn list_location_tags<'e, E>(&self, executor: E) -> Result<Vec<LocationTag>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_location_tags(executor).await
    }

    pub async fn create_location_tag<'c, A>(
        &self,
        executor: A,
        session: &Session,
        input: &CreateLocationTagPayload,
    ) -> Result<LocationTag, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let tag = self.repo.create_location_tag(&mut *tx, input).await?;
        self.audit
            .record(&mut *tx, "location_tags", tag.id, AuditAction::Insert, session.profile_id, json!(tag))
            .await?;

        tx.commit().await?;

        tracing::info!(location_tag_id = %tag.id, "Rótulo de localização criado: {}", tag.label());
        Ok(tag)
    }

    pub async fn delete_location_tag<'c, A>(&self, executor: A, session: &Session, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if !self.repo.delete_location_tag(&mut *tx, id).await? {
            return Err(AppError::ResourceNotFound("LocationTag".into()));
        }
        self.audit
            .record(&mut *tx, "location_tags", id, AuditAction::Delete, session.profile_id, json!({}))
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Importa rótulos de localização de um CSV.
    ///
    /// Linhas inválidas voltam em `errors`; as válidas entram numa única
    /// transação. Rótulos já existentes são ignorados e não contam em `inserted`.
    pub async fn import_location_tags<'c, A>(
        &self,
        executor: A,
        session: &Session,
        content: &[u8],
    ) -> Result<ImportSummary, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let validation = validate_csv(content, LOCATION_TAG_REQUIRED_FIELDS)?;
        let rows: Vec<CreateLocationTagPayload> = validation.valid_rows.iter().filter_map(location_tag_from_record).collect();

        if rows.is_empty() {
            return Ok(ImportSummary { inserted: 0, errors: validation.errors });
        }

        let mut tx = executor.begin().await?;

        let inserted = self.repo.insert_location_tags(&mut *tx, &rows).await?;
        for tag in &inserted {
            self.audit
                .record(&mut *tx, "location_tags", tag.id, AuditAction::Insert, session.profile_id, json!(tag))
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            inserted = inserted.len(),
            rejected = validation.errors.len(),
            "Importação de rótulos de localização concluída"
        );

        Ok(ImportSummary {
            inserted: inserted.len(),
            errors: validation.errors,
        })
    }
}

// Linhas válidas sempre têm os campos obrigatórios preenchidos
fn location_tag_from_record(record: &CsvRecord) -> Option<CreateLocationTagPayload> {
    let field = |name: &str| record.get(name).cloned().flatten();

    Some(CreateLocationTagPayload {
        continent: field("continent")?,
        country: field("country")?,
        state: field("state"),
        city: field("city"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_csv_rows_become_location_tags() {
        let content = b"continent,country,state,city\nEurope,France,,Paris\nSouth America,Brazil,SP,\n";
        let validation = validate_csv(content, LOCATION_TAG_REQUIRED_FIELDS).unwrap();

        let tags: Vec<CreateLocationTagPayload> =
            validation.valid_rows.iter().filter_map(location_tag_from_record).collect();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].country, "France");
        assert_eq!(tags[0].state, None);
        assert_eq!(tags[0].city.as_deref(), Some("Paris"));
        assert_eq!(tags[1].state.as_deref(), Some("SP"));
        assert_eq!(tags[1].city, None);
    }

    #[test]
    fn optional_columns_may_be_absent_from_the_file() {
        let content = b"country,continent\nJapan,Asia\n";
        let validation = validate_csv(content, LOCATION_TAG_REQUIRED_FIELDS).unwrap();

        let tag = location_tag_from_record(&validation.valid_rows[0]).unwrap();

        assert_eq!(tag.continent, "Asia");
        assert_eq!(tag.country, "Japan");
        assert_eq!(tag.state, None);
        assert_eq!(tag.city, None);
    }
}
