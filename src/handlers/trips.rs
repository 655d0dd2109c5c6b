// src/handlers/trips.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Query;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::trip::{Trip, TripDetail, TripPayload},
    services::filters::TripFilter,
};

// GET /api/trips?searchTerm=&statuses=..&highPriorityOnly=&dateFrom=&dateTo=
#[utoipa::path(
    get,
    path = "/api/trips",
    tag = "Trips",
    params(TripFilter),
    responses(
        (status = 200, description = "Viagens filtradas", body = Vec<Trip>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_trips(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<TripFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let trips = app_state
        .trip_service
        .list(&mut *rls_conn, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(trips)))
}

// GET /api/trips/{id} (com as reservas)
#[utoipa::path(
    get,
    path = "/api/trips/{id}",
    tag = "Trips",
    params(("id" = Uuid, Path, description = "ID da viagem")),
    responses(
        (status = 200, description = "Viagem com suas reservas", body = TripDetail),
        (status = 404, description = "Viagem não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_trip(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .trip_service
        .get_detail(&mut *rls_conn, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/trips
#[utoipa::path(
    post,
    path = "/api/trips",
    tag = "Trips",
    request_body = TripPayload,
    responses(
        (status = 201, description = "Viagem criada", body = Trip),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_trip(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<TripPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let trip = app_state
        .trip_service
        .create(&mut *rls_conn, &user.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(trip)))
}

// PUT /api/trips/{id}
#[utoipa::path(
    put,
    path = "/api/trips/{id}",
    tag = "Trips",
    request_body = TripPayload,
    params(("id" = Uuid, Path, description = "ID da viagem")),
    responses(
        (status = 200, description = "Viagem atualizada", body = Trip),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Viagem não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_trip(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TripPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let trip = app_state
        .trip_service
        .update(&mut *rls_conn, &user.0, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(trip)))
}

// DELETE /api/trips/{id}
#[utoipa::path(
    delete,
    path = "/api/trips/{id}",
    tag = "Trips",
    params(("id" = Uuid, Path, description = "ID da viagem")),
    responses(
        (status = 204, description = "Viagem removida"),
        (status = 404, description = "Viagem não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_trip(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .trip_service
        .delete(&mut *rls_conn, &user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
