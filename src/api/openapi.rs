//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrowings, dashboard, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblios API",
        version = "0.1.0",
        description = "Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrowings
        borrowings::list_borrowings,
        borrowings::get_borrowing,
        borrowings::create_borrowing,
        borrowings::update_borrowing,
        borrowings::delete_borrowing,
        borrowings::return_borrowing,
        // Dashboard
        dashboard::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::AuthResponse,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::User,
            crate::models::user::UserSummary,
            // Books
            crate::models::book::Book,
            crate::models::book::BookWithActiveCount,
            crate::models::book::BookDetails,
            crate::models::book::PopularBook,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::BookResponse,
            // Borrowings
            crate::models::borrowing::Borrowing,
            crate::models::borrowing::BorrowingDetails,
            crate::models::borrowing::BorrowingStatus,
            crate::models::borrowing::CreateBorrowing,
            crate::models::borrowing::UpdateBorrowing,
            borrowings::BorrowingResponse,
            // Dashboard
            crate::services::dashboard::DashboardStats,
            crate::services::dashboard::DashboardCounts,
            // Shared
            health::HealthResponse,
            crate::api::MessageResponse,
            crate::error::ErrorResponse,
            crate::error::FieldError,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication"),
        (name = "books", description = "Book catalog"),
        (name = "borrowings", description = "Borrowing lifecycle"),
        (name = "dashboard", description = "Dashboard aggregates")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
