//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{LoginRequest, RegisterRequest, User},
};

use super::{AuthenticatedUser, MessageResponse};

/// Response for register and login: the user plus a bearer token
#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    request.validate()?;

    let (user, token) = state.services.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, token) = state
        .services
        .users
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(AuthResponse { user, token }))
}

/// Log out. Tokens are stateless; the client drops its copy.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout(AuthenticatedUser(_claims): AuthenticatedUser) -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out successfully"))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}
