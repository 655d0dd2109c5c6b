// src/handlers/reference.rs
//
// Tipos de serviço, tags e rótulos de localização.
// Leitura para qualquer papel; escrita e importação só para Admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, RoleAdmin},
    },
    models::reference::{
        CreateLocationTagPayload, CreateServiceTypePayload, CreateTagPayload, ImportSummary, LocationTag,
        ServiceType, Tag,
    },
};

// =============================================================================
//  TIPOS DE SERVIÇO
// =============================================================================

// GET /api/service-types
#[utoipa::path(
    get,
    path = "/api/service-types",
    tag = "Reference Data",
    responses(
        (status = 200, description = "Tipos de serviço", body = Vec<ServiceType>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_service_types(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state
        .reference_service
        .list_service_types(&mut *rls_conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rows)))
}

// POST /api/service-types
#[utoipa::path(
    post,
    path = "/api/service-types",
    tag = "Reference Data",
    request_body = CreateServiceTypePayload,
    responses(
        (status = 201, description = "Tipo de serviço criado", body = ServiceType),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Papel insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service_type(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<CreateServiceTypePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let service_type = app_state
        .reference_service
        .create_service_type(&mut *rls_conn, &user.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(service_type)))
}

// DELETE /api/service-types/{id}
#[utoipa::path(
    delete,
    path = "/api/service-types/{id}",
    tag = "Reference Data",
    params(("id" = Uuid, Path, description = "ID do tipo de serviço")),
    responses(
        (status = 204, description = "Tipo de serviço removido"),
        (status = 403, description = "Papel insuficiente"),
        (status = 404, description = "Tipo de serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service_type(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .reference_service
        .delete_service_type(&mut *rls_conn, &user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  TAGS
// =============================================================================

// GET /api/tags
#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "Reference Data",
    responses(
        (status = 200, description = "Tags", body = Vec<Tag>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tags(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state
        .reference_service
        .list_tags(&mut *rls_conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rows)))
}

// POST /api/tags
#[utoipa::path(
    post,
    path = "/api/tags",
    tag = "Reference Data",
    request_body = CreateTagPayload,
    responses(
        (status = 201, description = "Tag criada", body = Tag),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Papel insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tag(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<CreateTagPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let tag = app_state
        .reference_service
        .create_tag(&mut *rls_conn, &user.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(tag)))
}

// DELETE /api/tags/{id}
#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    tag = "Reference Data",
    params(("id" = Uuid, Path, description = "ID da tag")),
    responses(
        (status = 204, description = "Tag removida"),
        (status = 403, description = "Papel insuficiente"),
        (status = 404, description = "Tag não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_tag(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .reference_service
        .delete_tag(&mut *rls_conn, &user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  LOCALIZAÇÃO
// =============================================================================

// GET /api/location-tags
#[utoipa::path(
    get,
    path = "/api/location-tags",
    tag = "Reference Data",
    responses(
        (status = 200, description = "Rótulos de localização", body = Vec<LocationTag>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_location_tags(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state
        .reference_service
        .list_location_tags(&mut *rls_conn)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rows)))
}

// POST /api/location-tags
#[utoipa::path(
    post,
    path = "/api/location-tags",
    tag = "Reference Data",
    request_body = CreateLocationTagPayload,
    responses(
        (status = 201, description = "Rótulo criado", body = LocationTag),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Papel insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_location_tag(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<CreateLocationTagPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let tag = app_state
        .reference_service
        .create_location_tag(&mut *rls_conn, &user.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(tag)))
}

// POST /api/location-tags/import (corpo text/csv)
#[utoipa::path(
    post,
    path = "/api/location-tags/import",
    tag = "Reference Data",
    request_body(content = String, description = "CSV com continent, country, state, city", content_type = "text/csv"),
    responses(
        (status = 200, description = "Linhas inseridas e erros por linha", body = ImportSummary),
        (status = 400, description = "CSV ilegível"),
        (status = 403, description = "Papel insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_location_tags(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .reference_service
        .import_location_tags(&mut *rls_conn, &user.0, body.as_bytes())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// DELETE /api/location-tags/{id}
#[utoipa::path(
    delete,
    path = "/api/location-tags/{id}",
    tag = "Reference Data",
    params(("id" = Uuid, Path, description = "ID do rótulo")),
    responses(
        (status = 204, description = "Rótulo removido"),
        (status = 403, description = "Papel insuficiente"),
        (status = 404, description = "Rótulo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_location_tag(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .reference_service
        .delete_location_tag(&mut *rls_conn, &user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
