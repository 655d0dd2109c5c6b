// src/db/audit_repo.rs

use serde_json::Value;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::audit::{AuditAction, AuditLog, AuditLogQuery},
};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Clone, Default)]
pub struct AuditRepository;

impl AuditRepository {
    pub fn new() -> Self {
        Self
    }

    /// Grava uma entrada de auditoria. Chamado dentro da mesma transação da mutação.
    pub async fn record<'e, E>(
        &self,
        executor: E,
        table_name: &str,
        record_id: Uuid,
        action: AuditAction,
        changed_by: Uuid,
        details: Value,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (table_name, record_id, action, changed_by, details)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(table_name)
        .bind(record_id)
        .bind(action)
        .bind(changed_by)
        .bind(details)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn list<'e, E>(&self, executor: E, query: &AuditLogQuery) -> Result<Vec<AuditLog>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE ($1::text IS NULL OR table_name = $1)
              AND ($2::uuid IS NULL OR record_id = $2)
            ORDER BY changed_at DESC
            LIMIT $3
            "#,
        )
        .bind(&query.table_name)
        .bind(query.record_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(logs)
    }
}
