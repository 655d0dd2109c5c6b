// src/handlers/commissions.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::Query;

use crate::{
    common::{db_utils::get_rls_connection, error::ApiError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, RoleAdmin},
    },
    models::report::CommissionReport,
    services::filters::BookingFilter,
};

// GET /api/commissions/report (aceita os mesmos filtros de /api/bookings)
#[utoipa::path(
    get,
    path = "/api/commissions/report",
    tag = "Commissions",
    params(BookingFilter),
    responses(
        (status = 200, description = "Totais de comissão das reservas filtradas", body = CommissionReport),
        (status = 403, description = "Papel insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_commission_report(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Query(filter): Query<BookingFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .commission_report_service
        .report(&mut *rls_conn, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}
