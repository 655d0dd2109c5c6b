// src/models/reference.rs
//
// Dados de referência: tipos de serviço, tags e a hierarquia de localização.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

/// Rótulo geográfico: continente > país > estado/província > cidade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationTag {
    pub id: Uuid,
    pub continent: String,
    pub country: String,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl LocationTag {
    /// Do mais específico para o mais genérico ("Paris, Île-de-France, France, Europe").
    pub fn label(&self) -> String {
        [self.city.as_deref(), self.state.as_deref(), Some(self.country.as_str()), Some(self.continent.as_str())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceTypePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationTagPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Europe")]
    pub continent: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "France")]
    pub country: String,

    pub state: Option<String>,
    pub city: Option<String>,
}

// Resultado da importação em massa via CSV
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub inserted: usize,
    pub errors: Vec<crate::services::csv_import::CsvRowError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_skips_missing_levels() {
        let tag = LocationTag {
            id: Uuid::nil(),
            continent: "Europe".into(),
            country: "France".into(),
            state: None,
            city: Some("Paris".into()),
        };
        assert_eq!(tag.label(), "Paris, France, Europe");
    }
}
