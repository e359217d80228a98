//! Book model and related types

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::borrowing::Borrowing;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    /// Total copies owned by the library
    pub stock: i32,
    /// Copies currently loanable (stock minus active borrowings)
    pub available: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book with its count of active borrowings, for list views
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookWithActiveCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub book: Book,
    pub active_borrowings_count: i64,
}

/// Book with its most recent borrowings, for the detail view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub borrowings: Vec<Borrowing>,
}

/// Book with its all-time borrowing count, for the dashboard
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PopularBook {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub book: Book,
    pub borrowings_count: i64,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "The title field is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "The author field is required"))]
    pub author: String,
    #[validate(length(min = 1, max = 32, message = "The isbn field is required"))]
    pub isbn: String,
    #[validate(length(max = 255, message = "The publisher may not be greater than 255 characters"))]
    pub publisher: Option<String>,
    #[validate(custom(function = "validate_publication_year"))]
    pub publication_year: Option<i32>,
    #[validate(range(min = 0, message = "The stock must be at least 0"))]
    pub stock: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

/// Update book request. All fields optional; `available` is never accepted
/// from the caller, it is recomputed whenever `stock` changes.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "The title may not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "The author may not be empty"))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 32, message = "The isbn may not be empty"))]
    pub isbn: Option<String>,
    #[validate(length(max = 255, message = "The publisher may not be greater than 255 characters"))]
    pub publisher: Option<String>,
    #[validate(custom(function = "validate_publication_year"))]
    pub publication_year: Option<i32>,
    #[validate(range(min = 0, message = "The stock must be at least 0"))]
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

/// Publication year must be plausible: 1000 up to the current year.
fn validate_publication_year(year: i32) -> Result<(), ValidationError> {
    let current_year = Utc::now().year();
    if year < 1000 || year > current_year {
        let mut err = ValidationError::new("publication_year");
        err.message = Some(
            format!(
                "The publication year must be between 1000 and {}",
                current_year
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}
