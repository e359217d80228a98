//! Borrowing model and lifecycle types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::book::Book;
use super::user::UserSummary;

/// Borrowing status. `overdue` is a label only, it is never derived from
/// `due_date` by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowingStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl BorrowingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowingStatus::Borrowed => "borrowed",
            BorrowingStatus::Returned => "returned",
            BorrowingStatus::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for BorrowingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(BorrowingStatus::Borrowed),
            "returned" => Ok(BorrowingStatus::Returned),
            "overdue" => Ok(BorrowingStatus::Overdue),
            _ => Err(format!("Invalid borrowing status: {}", s)),
        }
    }
}

// SQLx conversion: status is stored as TEXT
impl sqlx::Type<Postgres> for BorrowingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BorrowingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Borrowing model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Borrowing with its user and book joined in, for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowingDetails {
    #[serde(flatten)]
    pub borrowing: Borrowing,
    pub user: UserSummary,
    pub book: Book,
}

/// Create borrowing request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_borrow_dates"))]
pub struct CreateBorrowing {
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
}

fn validate_borrow_dates(req: &CreateBorrowing) -> Result<(), ValidationError> {
    if req.due_date <= req.borrow_date {
        let mut err = ValidationError::new("due_date");
        err.message = Some("The due date must be after the borrow date".into());
        return Err(err);
    }
    Ok(())
}

/// Update borrowing request. `status` and `return_date` are interpreted
/// through the lifecycle transitions, not written verbatim; only `notes`
/// is a free-form update.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBorrowing {
    pub return_date: Option<DateTime<Utc>>,
    pub status: Option<BorrowingStatus>,
    pub notes: Option<String>,
}

/// Borrowing list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BorrowingQuery {
    /// Filter by status (borrowed, returned, overdue)
    pub status: Option<BorrowingStatus>,
    /// Restrict to the authenticated user's own borrowings
    pub my_borrowings: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_round_trip() {
        for status in [
            BorrowingStatus::Borrowed,
            BorrowingStatus::Returned,
            BorrowingStatus::Overdue,
        ] {
            assert_eq!(status.as_str().parse::<BorrowingStatus>().unwrap(), status);
        }
        assert!("late".parse::<BorrowingStatus>().is_err());
    }

    #[test]
    fn test_due_date_must_follow_borrow_date() {
        let now = Utc::now();
        let req = CreateBorrowing {
            book_id: 1,
            borrow_date: now,
            due_date: now,
            notes: None,
        };
        assert!(req.validate().is_err());

        let req = CreateBorrowing {
            book_id: 1,
            borrow_date: now,
            due_date: now + Duration::days(14),
            notes: None,
        };
        assert!(req.validate().is_ok());
    }
}
