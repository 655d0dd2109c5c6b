// src/services/client_service.rs

use serde_json::json;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, BookingRepository, ClientRepository},
    models::{
        audit::AuditAction,
        booking::Booking,
        client::{Client, ClientPayload},
        profile::Session,
    },
    services::filters::{ClientFilter, RecordFilter},
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    booking_repo: BookingRepository,
    audit: AuditRepository,
}

impl ClientService {
    pub fn new(repo: ClientRepository, booking_repo: BookingRepository, audit: AuditRepository) -> Self {
        Self { repo, booking_repo, audit }
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &ClientFilter) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = self.repo.list(executor).await?;
        Ok(filter.apply(clients))
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Client".into()))
    }

    // Histórico de reservas do cliente
    pub async fn bookings(&self, conn: &mut PgConnection, id: Uuid) -> Result<Vec<Booking>, AppError> {
        if self.repo.find_by_id(&mut *conn, id).await?.is_none() {
            return Err(AppError::ResourceNotFound("Client".into()));
        }

        self.booking_repo.list_by_client(conn, id).await
    }

    pub async fn create<'c, A>(&self, executor: A, session: &Session, input: &ClientPayload) -> Result<Client, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let client = self.repo.create(&mut *tx, input).await?;
        self.audit
            .record(&mut *tx, "clients", client.id, AuditAction::Insert, session.profile_id, json!(client))
            .await?;

        tx.commit().await?;

        tracing::info!(client_id = %client.id, "Cliente criado");
        Ok(client)
    }

    pub async fn update<'c, A>(
        &self,
        executor: A,
        session: &Session,
        id: Uuid,
        input: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let client = self
            .repo
            .update(&mut *tx, id, input)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Client".into()))?;
        self.audit
            .record(&mut *tx, "clients", id, AuditAction::Update, session.profile_id, json!(client))
            .await?;

        tx.commit().await?;
        Ok(client)
    }

    pub async fn delete<'c, A>(&self, executor: A, session: &Session, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'c, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let client = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Client".into()))?;

        self.repo.delete(&mut *tx, id).await?;
        self.audit
            .record(&mut *tx, "clients", id, AuditAction::Delete, session.profile_id, json!(client))
            .await?;

        tx.commit().await?;

        tracing::info!(client_id = %id, "Cliente removido");
        Ok(())
    }
}
