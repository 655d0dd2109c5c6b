// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::{I18nStore, DEFAULT_LANG},
    middleware::i18n::Locale,
    models::profile::UserRole,
};

// Erros de domínio. A camada HTTP converte cada um em ApiError (status + mensagem traduzida).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Perfil inativo")]
    ProfileInactive,

    #[error("Papel {0} necessário")]
    Forbidden(UserRole),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Registro ainda referenciado: {0}")]
    StillReferenced(String),

    #[error("O fornecedor não oferece o tipo de serviço selecionado")]
    ServiceTypeNotOffered,

    #[error("CSV inválido: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// Cria um erro de validação para um único campo (regras que o `validator` não cobre).
pub fn field_error(field: &'static str, code: &'static str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut err = validator::ValidationError::new(code);
    err.message = Some(code.into());
    errors.add(field, err);
    AppError::ValidationError(errors)
}

impl AppError {
    /// Traduz uma violação de unicidade/FK do Postgres num erro amigável para `resource`.
    pub fn from_db(e: sqlx::Error, resource: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation(resource.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return AppError::StillReferenced(resource.to_string());
            }
        }
        e.into()
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();

        match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let codes = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), codes);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: store.translate(lang, "validation_failed", &[]),
                    details: Some(json!(details)),
                }
            }
            AppError::InvalidToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                store.translate(lang, "invalid_token", &[]),
            ),
            AppError::ProfileInactive => ApiError::new(
                StatusCode::FORBIDDEN,
                store.translate(lang, "profile_inactive", &[]),
            ),
            AppError::Forbidden(role) => ApiError::new(
                StatusCode::FORBIDDEN,
                store.translate(lang, "forbidden", &[("role", role.as_str())]),
            ),
            AppError::ResourceNotFound(resource) => ApiError::new(
                StatusCode::NOT_FOUND,
                store.translate(lang, "not_found", &[("resource", resource)]),
            ),
            AppError::UniqueConstraintViolation(resource) => ApiError::new(
                StatusCode::CONFLICT,
                store.translate(lang, "already_exists", &[("resource", resource)]),
            ),
            AppError::StillReferenced(resource) => ApiError::new(
                StatusCode::CONFLICT,
                store.translate(lang, "still_referenced", &[("resource", resource)]),
            ),
            AppError::ServiceTypeNotOffered => ApiError::new(
                StatusCode::BAD_REQUEST,
                store.translate(lang, "service_type_not_offered", &[]),
            ),
            AppError::CsvError(e) => ApiError::new(
                StatusCode::BAD_REQUEST,
                store.translate(lang, "invalid_csv", &[("detail", &e.to_string())]),
            ),

            // Banco e erros inesperados viram 500; o detalhe fica só no log.
            e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    store.translate(lang, "internal_error", &[]),
                )
            }
        }
    }
}

// Rejeição HTTP padrão de todos os handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Fallback para quando não há Locale à mão (ex.: middleware).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale(DEFAULT_LANG.to_string()), &I18nStore::new())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> Locale {
        Locale("en".into())
    }

    #[test]
    fn not_found_maps_to_404_with_resource_name() {
        let api = AppError::ResourceNotFound("Booking".into()).to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Booking not found.");
    }

    #[test]
    fn field_error_carries_field_and_code() {
        let api = field_error("endDate", "end_before_start").to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details, Some(json!({ "endDate": ["end_before_start"] })));
    }

    #[test]
    fn forbidden_names_required_role_in_portuguese() {
        let api = AppError::Forbidden(UserRole::SuperAdmin)
            .to_api_error(&Locale("pt".into()), &I18nStore::new());
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert_eq!(api.error, "O papel 'SuperAdmin' é necessário para esta ação.");
    }

    #[test]
    fn database_errors_hide_details() {
        let api = AppError::DatabaseError(sqlx::Error::RowNotFound).to_api_error(&en(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
    }
}
