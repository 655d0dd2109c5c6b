// src/models/vendor.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub service_area: Option<String>,

    // Percentual (ex: 10.5 = 10,5%)
    pub commission_rate: Decimal,

    // 1 a 5
    pub price_range: i16,

    // 0 a 5
    pub rating: Decimal,

    // Vínculos N:N, agregados via array_agg
    pub service_type_ids: Vec<Uuid>,
    pub tag_ids: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Pousada Mar Azul")]
    pub name: String,

    pub contact_person: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub service_area: Option<String>,

    #[serde(default)]
    #[schema(example = 7.25)]
    pub commission_rate: Decimal,

    #[validate(range(min = 1, max = 5, message = "invalid_price_range"))]
    #[schema(example = 3)]
    pub price_range: i16,

    #[serde(default)]
    pub rating: Decimal,

    #[serde(default)]
    pub service_type_ids: Vec<Uuid>,

    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

/// O que o formulário de reserva precisa quando um fornecedor é escolhido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRate {
    pub vendor_id: Uuid,
    pub commission_rate: Decimal,
    pub service_type_ids: Vec<Uuid>,
}
