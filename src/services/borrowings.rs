//! Borrowing lifecycle service.
//!
//! Transitions: creation starts a borrowing as `borrowed` and consumes one
//! available copy; `returned` is reached exactly once and gives the copy
//! back; `overdue` is a label with no availability effect. A generic update
//! request is interpreted through these transitions rather than written
//! verbatim.

use crate::{
    error::AppResult,
    models::borrowing::{
        BorrowingDetails, BorrowingQuery, BorrowingStatus, CreateBorrowing, UpdateBorrowing,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
}

impl BorrowingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List borrowings, optionally filtered by status or restricted to the
    /// requesting user's own records
    pub async fn list_borrowings(
        &self,
        query: &BorrowingQuery,
        user_id: i32,
    ) -> AppResult<Vec<BorrowingDetails>> {
        self.repository.borrowings.list(query, user_id).await
    }

    /// Get a borrowing with its user and book
    pub async fn get_borrowing(&self, id: i32) -> AppResult<BorrowingDetails> {
        self.repository.borrowings.get_details(id).await
    }

    /// Borrow a book for a user. Fails without mutation when no copy is
    /// available.
    pub async fn create_borrowing(
        &self,
        user_id: i32,
        req: CreateBorrowing,
    ) -> AppResult<BorrowingDetails> {
        self.repository.borrowings.create(user_id, &req).await
    }

    /// Apply an update request through the lifecycle rules
    pub async fn update_borrowing(
        &self,
        id: i32,
        req: UpdateBorrowing,
    ) -> AppResult<BorrowingDetails> {
        let current = self.repository.borrowings.get_by_id(id).await?;

        match req.status {
            Some(BorrowingStatus::Returned) if current.status != BorrowingStatus::Returned => {
                self.repository
                    .borrowings
                    .mark_returned(id, req.return_date)
                    .await?;
            }
            Some(BorrowingStatus::Overdue) => {
                self.repository.borrowings.mark_overdue(id).await?;
            }
            // `borrowed` is only entered at creation; a redundant `returned`
            // is a no-op here rather than an error
            _ => {}
        }

        if let Some(ref notes) = req.notes {
            self.repository.borrowings.update_notes(id, notes).await?;
        }

        self.repository.borrowings.get_details(id).await
    }

    /// Return a borrowed book. Rejected when already returned.
    pub async fn return_borrowing(&self, id: i32) -> AppResult<BorrowingDetails> {
        self.repository.borrowings.mark_returned(id, None).await
    }

    /// Delete a borrowing record. An active one is implicitly returned first.
    pub async fn delete_borrowing(&self, id: i32) -> AppResult<()> {
        self.repository.borrowings.delete(id).await
    }
}
