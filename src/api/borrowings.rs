//! Borrowing endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::borrowing::{BorrowingDetails, BorrowingQuery, CreateBorrowing, UpdateBorrowing},
};

use super::{AuthenticatedUser, MessageResponse};

/// Response wrapping a borrowing with a status message
#[derive(Serialize, ToSchema)]
pub struct BorrowingResponse {
    pub message: String,
    pub borrowing: BorrowingDetails,
}

/// List borrowings with optional filters
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Filter by status (borrowed, returned, overdue)"),
        ("my_borrowings" = Option<bool>, Query, description = "Only the authenticated user's borrowings")
    ),
    responses(
        (status = 200, description = "List of borrowings", body = Vec<BorrowingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowingQuery>,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let borrowings = state
        .services
        .borrowings
        .list_borrowings(&query, claims.user_id)
        .await?;
    Ok(Json(borrowings))
}

/// Get a borrowing by ID
#[utoipa::path(
    get,
    path = "/borrowings/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Borrowing details", body = BorrowingDetails),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn get_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingDetails>> {
    let borrowing = state.services.borrowings.get_borrowing(id).await?;
    Ok(Json(borrowing))
}

/// Borrow a book for the authenticated user
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowing,
    responses(
        (status = 201, description = "Borrowing created", body = BorrowingResponse),
        (status = 400, description = "Book is not available"),
        (status = 422, description = "Validation failed (bad dates, unknown book)")
    )
)]
pub async fn create_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrowing>,
) -> AppResult<(StatusCode, Json<BorrowingResponse>)> {
    request.validate()?;

    let borrowing = state
        .services
        .borrowings
        .create_borrowing(claims.user_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowingResponse {
            message: "Book borrowed successfully".to_string(),
            borrowing,
        }),
    ))
}

/// Update a borrowing. Status and return date changes go through the
/// lifecycle transitions; only notes are free-form.
#[utoipa::path(
    put,
    path = "/borrowings/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    request_body = UpdateBorrowing,
    responses(
        (status = 200, description = "Borrowing updated", body = BorrowingResponse),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn update_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBorrowing>,
) -> AppResult<Json<BorrowingResponse>> {
    let borrowing = state.services.borrowings.update_borrowing(id, request).await?;

    Ok(Json(BorrowingResponse {
        message: "Borrowing updated successfully".to_string(),
        borrowing,
    }))
}

/// Delete a borrowing record
#[utoipa::path(
    delete,
    path = "/borrowings/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Borrowing deleted", body = MessageResponse),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn delete_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.borrowings.delete_borrowing(id).await?;
    Ok(Json(MessageResponse::new(
        "Borrowing record deleted successfully",
    )))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowingResponse),
        (status = 400, description = "Book already returned"),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingResponse>> {
    let borrowing = state.services.borrowings.return_borrowing(id).await?;

    Ok(Json(BorrowingResponse {
        message: "Book returned successfully".to_string(),
        borrowing,
    }))
}
