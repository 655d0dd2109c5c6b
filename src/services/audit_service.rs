// src/services/audit_service.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::AuditRepository,
    models::audit::{AuditLog, AuditLogQuery},
};

#[derive(Clone)]
pub struct AuditService {
    repo: AuditRepository,
}

impl AuditService {
    pub fn new(repo: AuditRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E, query: &AuditLogQuery) -> Result<Vec<AuditLog>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, query).await
    }
}
