// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::profile::{Session, UserRole},
    services::access::check_access,
};

/// Papel mínimo exigido por uma rota
pub trait RoleDef: Send + Sync + 'static {
    const ROLE: UserRole;
}

/// Guardião: rejeita com 403 quem não tem ao menos `R::ROLE`.
///
/// Depende da `Session` que o `auth_guard` injeta; sem ela, 401.
pub struct RequireRole<R>(pub PhantomData<R>);

impl<R, S> FromRequestParts<S> for RequireRole<R>
where
    R: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let role = parts.extensions.get::<Session>().map(|s| s.role);

        if role.is_none() {
            return Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store));
        }

        if !check_access(role, R::ROLE) {
            return Err(AppError::Forbidden(R::ROLE).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// PAPÉIS EXIGIDOS (TIPOS)
// ---

pub struct RoleAdmin;
impl RoleDef for RoleAdmin {
    const ROLE: UserRole = UserRole::Admin;
}

pub struct RoleSuperAdmin;
impl RoleDef for RoleSuperAdmin {
    const ROLE: UserRole = UserRole::SuperAdmin;
}
