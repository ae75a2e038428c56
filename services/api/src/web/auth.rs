//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration and login.
//!
//! Both return the user and a bearer token. There is no logout endpoint: the
//! token is stateless, so logging out means the client discards it.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bookshelf_core::domain::User;
use bookshelf_core::error::ServiceError;
use bookshelf_core::services::AuthSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// The public view of a user. The password hash never leaves the server.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.token,
        }
    }
}

fn bad_json(rejection: JsonRejection) -> HttpError {
    ServiceError::Validation(rejection.body_text()).into()
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/register - Create a new user account and log it in
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request or email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(req) = payload.map_err(bad_json)?;

    let session = state
        .auth
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

/// POST /api/auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid login credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(req) = payload.map_err(bad_json)?;

    let session = state.auth.login(&req.email, &req.password).await?;

    Ok((StatusCode::OK, Json(AuthResponse::from(session))))
}
