use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::token;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "access_token";

/// Authenticated user, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Validates the session token (cookie first, then `Authorization: Bearer`),
/// re-fetches the user, and injects it for downstream handlers. The fetch
/// guarantees a deleted account cannot keep using an unexpired token.
pub async fn require_auth(
    cookie_jar: CookieJar,
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookie_jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.to_string())
        })
        .ok_or(AppError::Unauthorized)?;

    let user_id = token::decode_token(&token, state.config.jwt_secret.as_bytes())?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser(user));
    Ok(next.run(req).await)
}
