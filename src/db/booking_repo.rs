// src/db/booking_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::replace_links, error::AppError},
    models::booking::{Booking, NewBooking, UpdateBookingStatusPayload},
};

// Reserva + nomes resolvidos (clientes, fornecedor, serviço) + agente da viagem
const BOOKING_SELECT: &str = r#"
    SELECT
        b.id,
        COALESCE(
            (SELECT array_agg(c.id ORDER BY c.last_name, c.first_name)
             FROM booking_clients bc JOIN clients c ON c.id = bc.client_id
             WHERE bc.booking_id = b.id),
            '{}'::uuid[]
        ) AS client_ids,
        COALESCE(
            (SELECT array_agg(c.first_name || ' ' || c.last_name ORDER BY c.last_name, c.first_name)
             FROM booking_clients bc JOIN clients c ON c.id = bc.client_id
             WHERE bc.booking_id = b.id),
            '{}'::text[]
        ) AS client_names,
        b.vendor_id,
        v.name AS vendor_name,
        b.service_type_id,
        st.name AS service_type_name,
        b.trip_id,
        t.agent_id,
        b.start_date, b.end_date, b.location,
        b.cost, b.commission_rate, b.commission_amount,
        b.booking_status, b.commission_status, b.is_completed, b.notes,
        b.created_at, b.updated_at
    FROM bookings b
    JOIN vendors v ON v.id = b.vendor_id
    JOIN service_types st ON st.id = b.service_type_id
    LEFT JOIN trips t ON t.id = b.trip_id
"#;

#[derive(Clone, Default)]
pub struct BookingRepository;

impl BookingRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{BOOKING_SELECT} ORDER BY b.start_date DESC, b.created_at DESC");
        let bookings = sqlx::query_as::<_, Booking>(&sql)
            .fetch_all(executor)
            .await?;

        Ok(bookings)
    }

    pub async fn list_by_client<'e, E>(&self, executor: E, client_id: Uuid) -> Result<Vec<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "{BOOKING_SELECT}
             WHERE EXISTS (SELECT 1 FROM booking_clients x WHERE x.booking_id = b.id AND x.client_id = $1)
             ORDER BY b.start_date DESC"
        );
        let bookings = sqlx::query_as::<_, Booking>(&sql)
            .bind(client_id)
            .fetch_all(executor)
            .await?;

        Ok(bookings)
    }

    pub async fn list_by_trip<'e, E>(&self, executor: E, trip_id: Uuid) -> Result<Vec<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{BOOKING_SELECT} WHERE b.trip_id = $1 ORDER BY b.start_date ASC");
        let bookings = sqlx::query_as::<_, Booking>(&sql)
            .bind(trip_id)
            .fetch_all(executor)
            .await?;

        Ok(bookings)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{BOOKING_SELECT} WHERE b.id = $1");
        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(booking)
    }

    pub async fn insert<'e, E>(&self, executor: E, input: &NewBooking) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (
                vendor_id, service_type_id, trip_id, start_date, end_date, location,
                cost, commission_rate, commission_amount,
                booking_status, commission_status, is_completed, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(input.vendor_id)
        .bind(input.service_type_id)
        .bind(input.trip_id)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.location)
        .bind(input.cost)
        .bind(input.commission_rate)
        .bind(input.commission_amount)
        .bind(input.booking_status)
        .bind(input.commission_status)
        .bind(input.is_completed)
        .bind(&input.notes)
        .fetch_one(executor)
        .await
        .map_err(Self::map_fk)?;

        Ok(id)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, input: &NewBooking) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET vendor_id = $2, service_type_id = $3, trip_id = $4,
                start_date = $5, end_date = $6, location = $7,
                cost = $8, commission_rate = $9, commission_amount = $10,
                booking_status = $11, commission_status = $12, is_completed = $13,
                notes = $14, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.vendor_id)
        .bind(input.service_type_id)
        .bind(input.trip_id)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.location)
        .bind(input.cost)
        .bind(input.commission_rate)
        .bind(input.commission_amount)
        .bind(input.booking_status)
        .bind(input.commission_status)
        .bind(input.is_completed)
        .bind(&input.notes)
        .execute(executor)
        .await
        .map_err(Self::map_fk)?;

        Ok(result.rows_affected() > 0)
    }

    /// Atualiza só os campos de status informados.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateBookingStatusPayload,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET booking_status = COALESCE($2, booking_status),
                commission_status = COALESCE($3, commission_status),
                is_completed = COALESCE($4, is_completed),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.booking_status)
        .bind(input.commission_status)
        .bind(input.is_completed)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_clients<'e, E>(&self, executor: E, booking_id: Uuid, ids: &[Uuid]) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        replace_links(executor, "booking_clients", "booking_id", "client_id", booking_id, ids, "Client").await
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // Viagem informada que não existe
    fn map_fk(e: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_foreign_key_violation() {
                return AppError::ResourceNotFound("Trip".into());
            }
        }
        e.into()
    }
}
