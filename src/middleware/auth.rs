// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::profile::{Claims, Session},
};

/// Valida o Bearer JWT emitido pelo serviço de autenticação, carrega o perfil
/// e injeta a `Session` nas extensions da requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| to_api(AppError::InvalidToken))?;

    let session = load_session(&app_state, bearer.0.token()).await.map_err(to_api)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

async fn load_session(app_state: &AppState, token: &str) -> Result<Session, AppError> {
    let claims = decode_claims(token, &app_state.jwt_secret)?;

    let profile = app_state
        .profile_repo
        .find_for_session(claims.sub)
        .await?
        .ok_or(AppError::InvalidToken)?;

    if !profile.is_active {
        tracing::warn!(profile_id = %profile.id, "Acesso negado: perfil inativo");
        return Err(AppError::ProfileInactive);
    }

    Ok(Session::from(&profile))
}

fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        tracing::debug!("JWT rejeitado: {}", e);
        AppError::InvalidToken
    })?;

    Ok(token_data.claims)
}

// Extrator para obter a sessão autenticada diretamente nos handlers
pub struct AuthenticatedUser(pub Session);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    fn token(sub: Uuid, secret: &str, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub,
            iat: now as usize,
            exp: (now + exp_offset) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn valid_token_yields_subject() {
        let sub = Uuid::new_v4();
        let claims = decode_claims(&token(sub, "segredo", 3600), "segredo").unwrap();
        assert_eq!(claims.sub, sub);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let result = decode_claims(&token(Uuid::new_v4(), "segredo", 3600), "outro");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let result = decode_claims(&token(Uuid::new_v4(), "segredo", -3600), "segredo");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
