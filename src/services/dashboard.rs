//! Dashboard read model. Pure aggregation, recomputed on every request.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book::PopularBook, borrowing::BorrowingDetails},
    repository::Repository,
};

/// Number of entries in the recent and popular lists
const TOP_N: i64 = 5;

/// Aggregate counters for the dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardCounts {
    pub total_books: i64,
    pub total_users: i64,
    /// Borrowings with status exactly `borrowed`; overdue-labelled rows are
    /// not counted
    pub active_borrowings: i64,
    pub total_borrowings: i64,
}

/// Full dashboard payload
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub stats: DashboardCounts,
    pub recent_borrowings: Vec<BorrowingDetails>,
    pub popular_books: Vec<PopularBook>,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Compute all dashboard aggregates
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let stats = DashboardCounts {
            total_books: self.repository.books.count().await?,
            total_users: self.repository.users.count().await?,
            active_borrowings: self.repository.borrowings.count_active().await?,
            total_borrowings: self.repository.borrowings.count_total().await?,
        };

        let recent_borrowings = self.repository.borrowings.recent_with_details(TOP_N).await?;
        let popular_books = self.repository.books.popular(TOP_N).await?;

        Ok(DashboardStats {
            stats,
            recent_borrowings,
            popular_books,
        })
    }
}
