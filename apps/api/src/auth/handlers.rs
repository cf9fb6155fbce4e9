use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::{AuthUser, SESSION_COOKIE};
use crate::auth::{password, token};
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 64,
        message = "password must be between 8 and 64 characters"
    ))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}

/// POST /api/v1/auth/register
/// Creates the account in a pending-confirmation state.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let password_hash = password::hash(&body.password)?;
    let verification_token = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, email_verified, verification_token)
        VALUES ($1, $2, $3, FALSE, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(body.email.to_lowercase())
    .bind(&password_hash)
    .bind(&verification_token)
    .execute(&state.db)
    .await
    .map_err(|e| AppError::from_insert(e, "an account with this email already exists"))?;

    tracing::info!("Registered account for {}", body.email);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Registration successful. Please verify your email address.".to_string(),
        }),
    ))
}

/// GET /api/v1/auth/verify?token=
pub async fn handle_verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let updated: Option<(Uuid,)> = sqlx::query_as(
        r#"
        UPDATE users
        SET email_verified = TRUE, verification_token = NULL
        WHERE verification_token = $1
        RETURNING id
        "#,
    )
    .bind(&query.token)
    .fetch_optional(&state.db)
    .await?;

    updated.ok_or_else(|| AppError::NotFound("unknown or expired verification token".to_string()))?;

    Ok(Json(MessageResponse {
        message: "Email verified. You can now sign in.".to_string(),
    }))
}

/// POST /api/v1/auth/login
/// Failures are deliberately opaque: a missing account and a wrong password
/// produce the same 401.
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    body.validate().map_err(|_| AppError::Unauthorized)?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(body.email.to_lowercase())
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or(AppError::Unauthorized)?;

    if !password::verify(&body.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = token::create_token(
        user.id,
        state.config.jwt_secret.as_bytes(),
        state.config.jwt_maxage_secs,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token creation failed: {e}")))?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(state.config.jwt_maxage_secs))
        .build();

    tracing::info!(user_id = %user.id, "Login successful");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            user_id: user.id,
        }),
    ))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build();

    (
        jar.add(cookie),
        Json(MessageResponse {
            message: "Signed out.".to_string(),
        }),
    )
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    axum::Extension(AuthUser(user)): axum::Extension<AuthUser>,
) -> Json<User> {
    Json(user)
}
