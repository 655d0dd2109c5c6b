// src/models/trip.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

use crate::models::booking::Booking;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "trip_status")]
pub enum TripStatus {
    Planned,
    Ongoing,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub name: String,
    pub status: TripStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub high_priority: bool,
    pub client_ids: Vec<Uuid>,
    pub client_names: Vec<String>,
    pub location_tag_ids: Vec<Uuid>,
    pub agent_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    pub status: Option<TripStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub high_priority: bool,

    #[serde(default)]
    pub client_ids: Vec<Uuid>,

    #[serde(default)]
    pub location_tag_ids: Vec<Uuid>,

    // Se omitido na criação, o agente é quem está logado
    pub agent_id: Option<Uuid>,
    pub notes: Option<String>,
}

// Detalhe: a viagem com as reservas agrupadas nela
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: Trip,
    pub bookings: Vec<Booking>,
}
