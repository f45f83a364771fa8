use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;
use crate::AppState;

/// Authenticated principal extracted from a verified token and re-resolved
/// against the users table, available to handlers via request extensions.
#[derive(Clone, Debug, Serialize, FromRow)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug)]
enum TokenError {
    Expired,
    Invalid,
}

/// JWT authentication middleware. Runs unconditionally before every record
/// operation: verifies the bearer token and confirms the embedded user still
/// exists before letting the request through.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).ok_or_else(|| {
        ApiError::unauthorized("Access token required", "Please provide a valid authentication token")
    })?;

    let claims = validate_jwt(&token).map_err(|e| match e {
        TokenError::Expired => ApiError::unauthorized("Token expired", "Please log in again"),
        TokenError::Invalid => {
            ApiError::unauthorized("Invalid token", "Please provide a valid authentication token")
        }
    })?;

    // A valid token for a deleted user is still rejected
    let user = sqlx::query_as::<_, AuthUser>("SELECT id, name, email FROM users WHERE id = ?")
        .bind(claims.sub)
        .fetch_optional(state.db.pool())
        .await
        .map_err(|e| {
            tracing::error!("authentication lookup failed: {}", e);
            ApiError::internal("Authentication failed")
        })?
        .ok_or_else(|| ApiError::unauthorized("Invalid token", "User no longer exists"))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn validate_jwt(token: &str) -> Result<Claims, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::Invalid);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    })?;

    Ok(token_data.claims)
}
