// src/db/reference_repo.rs
//
// Tipos de serviço, tags e rótulos de localização.

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reference::{
        CreateLocationTagPayload, CreateServiceTypePayload, CreateTagPayload, LocationTag,
        ServiceType, Tag,
    },
};

#[derive(Clone, Default)]
pub struct ReferenceRepository;

impl ReferenceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  TIPOS DE SERVIÇO
    // =========================================================================

    pub async fn list_service_types<'e, E>(&self, executor: E) -> Result<Vec<ServiceType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ServiceType>("SELECT * FROM service_types ORDER BY name ASC")
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    /// Ids de todos os tipos, usados como "permitidos" quando o fornecedor não restringe.
    pub async fn list_service_type_ids<'e, E>(&self, executor: E) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar("SELECT id FROM service_types ORDER BY name ASC")
            .fetch_all(executor)
            .await?;

        Ok(ids)
    }

    pub async fn create_service_type<'e, E>(
        &self,
        executor: E,
        input: &CreateServiceTypePayload,
    ) -> Result<ServiceType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ServiceType>(
            "INSERT INTO service_types (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "ServiceType"))
    }

    pub async fn delete_service_type<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM service_types WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_db(e, "ServiceType"))?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  TAGS
    // =========================================================================

    pub async fn list_tags<'e, E>(&self, executor: E) -> Result<Vec<Tag>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name ASC")
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    pub async fn create_tag<'e, E>(&self, executor: E, input: &CreateTagPayload) -> Result<Tag, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Tag>("INSERT INTO tags (name) VALUES ($1) RETURNING *")
            .bind(input.name.trim())
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, "Tag"))
    }

    pub async fn delete_tag<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LOCALIZAÇÃO
    // =========================================================================

    pub async fn list_location_tags<'e, E>(&self, executor: E) -> Result<Vec<LocationTag>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, LocationTag>(
            "SELECT * FROM location_tags ORDER BY continent, country, state NULLS FIRST, city NULLS FIRST",
        )
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn create_location_tag<'e, E>(
        &self,
        executor: E,
        input: &CreateLocationTagPayload,
    ) -> Result<LocationTag, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LocationTag>(
            r#"
            INSERT INTO location_tags (continent, country, state, city)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(input.continent.trim())
        .bind(input.country.trim())
        .bind(&input.state)
        .bind(&input.city)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "LocationTag"))
    }

    /// Inserção em lote; duplicatas são ignoradas. Retorna só as linhas que entraram.
    pub async fn insert_location_tags<'e, E>(
        &self,
        executor: E,
        rows: &[CreateLocationTagPayload],
    ) -> Result<Vec<LocationTag>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let continents: Vec<&str> = rows.iter().map(|r| r.continent.as_str()).collect();
        let countries: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
        let states: Vec<Option<&str>> = rows.iter().map(|r| r.state.as_deref()).collect();
        let cities: Vec<Option<&str>> = rows.iter().map(|r| r.city.as_deref()).collect();

        let inserted = sqlx::query_as::<_, LocationTag>(
            r#"
            INSERT INTO location_tags (continent, country, state, city)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[])
            ON CONFLICT DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&continents)
        .bind(&countries)
        .bind(&states)
        .bind(&cities)
        .fetch_all(executor)
        .await?;

        Ok(inserted)
    }

    pub async fn delete_location_tag<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM location_tags WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
