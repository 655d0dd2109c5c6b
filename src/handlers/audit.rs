// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{db_utils::get_rls_connection, error::ApiError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, RoleSuperAdmin},
    },
    models::audit::{AuditLog, AuditLogQuery},
};

// GET /api/audit-logs?tableName=&recordId=&limit=
#[utoipa::path(
    get,
    path = "/api/audit-logs",
    tag = "Audit",
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Entradas do log de auditoria", body = Vec<AuditLog>),
        (status = 403, description = "Exige SuperAdmin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_audit_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleSuperAdmin>,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state.db_pool, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let logs = app_state
        .audit_service
        .list(&mut *rls_conn, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(logs)))
}
