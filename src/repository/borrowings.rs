//! Borrowings repository for database operations.
//!
//! Lifecycle transitions and their availability side effects run inside a
//! transaction, with the check-then-write collapsed into one conditional
//! UPDATE. Two concurrent borrows of the last copy cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrowing::{
            Borrowing, BorrowingDetails, BorrowingQuery, BorrowingStatus, CreateBorrowing,
        },
        user::UserSummary,
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT br.id, br.user_id, br.book_id, br.borrow_date, br.due_date,
           br.return_date, br.status, br.notes, br.created_at, br.updated_at,
           u.name as user_name, u.email as user_email,
           b.title, b.author, b.isbn, b.publisher, b.publication_year,
           b.stock, b.available, b.description, b.cover_image,
           b.created_at as book_created_at, b.updated_at as book_updated_at
    FROM borrowings br
    JOIN users u ON br.user_id = u.id
    JOIN books b ON br.book_id = b.id
"#;

fn details_from_row(row: &PgRow) -> BorrowingDetails {
    let user_id: i32 = row.get("user_id");
    let book_id: i32 = row.get("book_id");

    BorrowingDetails {
        borrowing: Borrowing {
            id: row.get("id"),
            user_id,
            book_id,
            borrow_date: row.get("borrow_date"),
            due_date: row.get("due_date"),
            return_date: row.get("return_date"),
            status: row.get("status"),
            notes: row.get("notes"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        },
        user: UserSummary {
            id: user_id,
            name: row.get("user_name"),
            email: row.get("user_email"),
        },
        book: Book {
            id: book_id,
            title: row.get("title"),
            author: row.get("author"),
            isbn: row.get("isbn"),
            publisher: row.get("publisher"),
            publication_year: row.get("publication_year"),
            stock: row.get("stock"),
            available: row.get("available"),
            description: row.get("description"),
            cover_image: row.get("cover_image"),
            created_at: row.get("book_created_at"),
            updated_at: row.get("book_updated_at"),
        },
    }
}

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrowing by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Borrowing> {
        sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))
    }

    /// Get borrowing with its user and book
    pub async fn get_details(&self, id: i32) -> AppResult<BorrowingDetails> {
        let sql = format!("{} WHERE br.id = $1", DETAILS_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;

        Ok(details_from_row(&row))
    }

    /// List borrowings with optional status and owner filters, newest first
    pub async fn list(&self, query: &BorrowingQuery, user_id: i32) -> AppResult<Vec<BorrowingDetails>> {
        let mut conditions: Vec<String> = Vec::new();

        // Filter values are typed (enum label, integer id), not raw input
        if let Some(status) = query.status {
            conditions.push(format!("br.status = '{}'", status.as_str()));
        }
        if query.my_borrowings.unwrap_or(false) {
            conditions.push(format!("br.user_id = {}", user_id));
        }

        let where_clause = if conditions.is_empty() {
            "TRUE".to_string()
        } else {
            conditions.join(" AND ")
        };

        let sql = format!(
            "{} WHERE {} ORDER BY br.created_at DESC, br.id DESC",
            DETAILS_SELECT, where_clause
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Most recent borrowings across all books, for the dashboard
    pub async fn recent_with_details(&self, limit: i64) -> AppResult<Vec<BorrowingDetails>> {
        let sql = format!(
            "{} ORDER BY br.created_at DESC, br.id DESC LIMIT $1",
            DETAILS_SELECT
        );
        let rows = sqlx::query(&sql).bind(limit).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Create a borrowing. The availability check and decrement are one
    /// conditional UPDATE inside the same transaction as the insert, so a
    /// failed borrow leaves nothing behind.
    pub async fn create(&self, user_id: i32, req: &CreateBorrowing) -> AppResult<BorrowingDetails> {
        let mut tx = self.pool.begin().await?;

        let book_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(req.book_id)
            .fetch_one(&mut *tx)
            .await?;
        if !book_exists {
            return Err(AppError::field("book_id", "The selected book id is invalid"));
        }

        let decremented = sqlx::query(
            "UPDATE books SET available = available - 1, updated_at = NOW() \
             WHERE id = $1 AND available > 0",
        )
        .bind(req.book_id)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            return Err(AppError::BusinessRule(
                "Book is not available for borrowing".to_string(),
            ));
        }

        let borrowing_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO borrowings (user_id, book_id, borrow_date, due_date, status, notes)
            VALUES ($1, $2, $3, $4, 'borrowed', $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(req.book_id)
        .bind(req.borrow_date)
        .bind(req.due_date)
        .bind(&req.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Borrowing {} created for book {}", borrowing_id, req.book_id);

        self.get_details(borrowing_id).await
    }

    /// Mark a borrowing as returned and hand the copy back to the book.
    /// Re-returning an already returned borrowing is rejected without any
    /// availability change.
    pub async fn mark_returned(
        &self,
        id: i32,
        return_date: Option<DateTime<Utc>>,
    ) -> AppResult<BorrowingDetails> {
        let mut tx = self.pool.begin().await?;

        let returned = sqlx::query(
            r#"
            UPDATE borrowings
            SET status = 'returned', return_date = COALESCE($2, NOW()), updated_at = NOW()
            WHERE id = $1 AND status != 'returned'
            RETURNING book_id
            "#,
        )
        .bind(id)
        .bind(return_date)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = returned else {
            // Either the row does not exist or it was already returned
            let status: Option<BorrowingStatus> =
                sqlx::query_scalar("SELECT status FROM borrowings WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return match status {
                Some(_) => Err(AppError::BusinessRule("Book already returned".to_string())),
                None => Err(AppError::NotFound(format!(
                    "Borrowing with id {} not found",
                    id
                ))),
            };
        };

        let book_id: i32 = row.get("book_id");
        sqlx::query("UPDATE books SET available = available + 1, updated_at = NOW() WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Borrowing {} returned, book {} available again", id, book_id);

        self.get_details(id).await
    }

    /// Set the overdue label. No availability side effect.
    pub async fn mark_overdue(&self, id: i32) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE borrowings SET status = 'overdue', updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Borrowing with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Update free-form notes
    pub async fn update_notes(&self, id: i32, notes: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE borrowings SET notes = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(notes)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Borrowing with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Delete a borrowing. Deleting an active one is an implicit return: the
    /// copy goes back to the book, but no return date is recorded.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM borrowings WHERE id = $1 RETURNING book_id, status")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;

        let status: BorrowingStatus = deleted.get("status");
        if status == BorrowingStatus::Borrowed {
            let book_id: i32 = deleted.get("book_id");
            sqlx::query(
                "UPDATE books SET available = available + 1, updated_at = NOW() WHERE id = $1",
            )
            .bind(book_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Count all borrowings
    pub async fn count_total(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrowings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count borrowings with status exactly 'borrowed'
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrowings WHERE status = 'borrowed'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
