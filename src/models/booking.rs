// src/models/booking.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

// --- ENUMS (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "booking_status")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "commission_status")]
pub enum CommissionStatus {
    Unreceived,
    Received,
    Canceled,
    Completed,
}

// --- Structs ---

/// Reserva como sai das consultas de listagem e detalhe: a linha da tabela
/// `bookings` mais os nomes já resolvidos de clientes, fornecedor e serviço.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,

    // Vínculos
    pub client_ids: Vec<Uuid>,
    pub client_names: Vec<String>,
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub service_type_id: Uuid,
    pub service_type_name: String,
    pub trip_id: Option<Uuid>,
    // Agente responsável pela viagem (se houver)
    pub agent_id: Option<Uuid>,

    // Datas
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,

    // Valores
    pub cost: Decimal,
    pub commission_rate: Decimal,
    pub commission_amount: Decimal, // cost * commission_rate / 100, sem arredondar

    pub booking_status: BookingStatus,
    pub commission_status: CommissionStatus,
    pub is_completed: bool,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Payload de criação/edição. Taxa e valor da comissão NÃO vêm do cliente:
// são derivados do fornecedor escolhido.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    #[validate(length(min = 1, message = "required"))]
    pub client_ids: Vec<Uuid>,

    pub vendor_id: Uuid,
    pub service_type_id: Uuid,
    pub trip_id: Option<Uuid>,

    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,

    #[schema(example = 250.5)]
    pub cost: Decimal,

    pub booking_status: Option<BookingStatus>,
    pub commission_status: Option<CommissionStatus>,
    #[serde(default)]
    pub is_completed: bool,
    pub notes: Option<String>,
}

// Dados já derivados, prontos para o repositório gravar
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub client_ids: Vec<Uuid>,
    pub vendor_id: Uuid,
    pub service_type_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub cost: Decimal,
    pub commission_rate: Decimal,
    pub commission_amount: Decimal,
    pub booking_status: BookingStatus,
    pub commission_status: CommissionStatus,
    pub is_completed: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusPayload {
    pub booking_status: Option<BookingStatus>,
    pub commission_status: Option<CommissionStatus>,
    pub is_completed: Option<bool>,
}

// Pré-visualização do formulário (cascata fornecedor -> serviços -> taxa)
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPreviewPayload {
    pub vendor_id: Option<Uuid>,
    pub service_type_id: Option<Uuid>,
    #[serde(default)]
    pub cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPreview {
    pub vendor_id: Option<Uuid>,
    pub service_type_id: Option<Uuid>,
    pub available_service_type_ids: Vec<Uuid>,
    pub cost: Decimal,
    pub commission_rate: Decimal,
    pub commission_amount: Decimal,
    // Valor arredondado em 2 casas, apenas para exibição
    pub commission_display: String,
}
