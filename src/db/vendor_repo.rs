// src/db/vendor_repo.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::replace_links, error::AppError},
    models::vendor::{Vendor, VendorPayload, VendorRate},
    services::commission::VendorRateSource,
};

// Fornecedor + vínculos N:N agregados em arrays
const VENDOR_SELECT: &str = r#"
    SELECT
        v.id, v.name, v.contact_person, v.email, v.phone, v.address, v.service_area,
        v.commission_rate, v.price_range, v.rating,
        COALESCE(
            (SELECT array_agg(vst.service_type_id) FROM vendor_service_types vst WHERE vst.vendor_id = v.id),
            '{}'::uuid[]
        ) AS service_type_ids,
        COALESCE(
            (SELECT array_agg(vt.tag_id) FROM vendor_tags vt WHERE vt.vendor_id = v.id),
            '{}'::uuid[]
        ) AS tag_ids,
        v.created_at, v.updated_at
    FROM vendors v
"#;

#[derive(Clone, Default)]
pub struct VendorRepository;

impl VendorRepository {
    pub fn new() -> Self {
        Self
    }

    /// Fonte de taxas presa à conexão (e à transação, se houver) de quem chama.
    pub fn rates<'c>(&self, conn: &'c mut PgConnection) -> VendorRates<'c> {
        VendorRates { conn }
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Vendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{VENDOR_SELECT} ORDER BY v.name ASC");
        let vendors = sqlx::query_as::<_, Vendor>(&sql)
            .fetch_all(executor)
            .await?;

        Ok(vendors)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Vendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{VENDOR_SELECT} WHERE v.id = $1");
        let vendor = sqlx::query_as::<_, Vendor>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(vendor)
    }

    /// Insere só a linha de `vendors`; os vínculos vão por `set_service_types` / `set_tags`.
    pub async fn insert<'e, E>(&self, executor: E, input: &VendorPayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO vendors (
                name, contact_person, email, phone, address, service_area,
                commission_rate, price_range, rating
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.service_area)
        .bind(input.commission_rate)
        .bind(input.price_range)
        .bind(input.rating)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, input: &VendorPayload) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE vendors
            SET name = $2, contact_person = $3, email = $4, phone = $5, address = $6,
                service_area = $7, commission_rate = $8, price_range = $9, rating = $10,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.service_area)
        .bind(input.commission_rate)
        .bind(input.price_range)
        .bind(input.rating)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_service_types<'e, E>(&self, executor: E, vendor_id: Uuid, ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        replace_links(executor, "vendor_service_types", "vendor_id", "service_type_id", vendor_id, ids, "ServiceType").await
    }

    pub async fn set_tags<'e, E>(&self, executor: E, vendor_id: Uuid, ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        replace_links(executor, "vendor_tags", "vendor_id", "tag_id", vendor_id, ids, "Tag").await
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Reservas apontam para o fornecedor sem cascade: FK vira 409
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_db(e, "Vendor"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct VendorRateRow {
    commission_rate: Decimal,
    service_type_ids: Vec<Uuid>,
}

pub struct VendorRates<'c> {
    conn: &'c mut PgConnection,
}

// A taxa plana do fornecedor é a fonte única da comissão das reservas.
#[async_trait]
impl VendorRateSource for VendorRates<'_> {
    async fn vendor_rate(&mut self, vendor_id: Uuid) -> Result<VendorRate, AppError> {
        let row = sqlx::query_as::<_, VendorRateRow>(
            r#"
            SELECT
                v.commission_rate,
                COALESCE(
                    (SELECT array_agg(vst.service_type_id) FROM vendor_service_types vst WHERE vst.vendor_id = v.id),
                    '{}'::uuid[]
                ) AS service_type_ids
            FROM vendors v
            WHERE v.id = $1
            "#,
        )
        .bind(vendor_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Vendor".into()))?;

        Ok(VendorRate {
            vendor_id,
            commission_rate: row.commission_rate,
            service_type_ids: row.service_type_ids,
        })
    }
}
