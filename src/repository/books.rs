//! Books repository for database operations.
//!
//! The `available` column is the availability tracker's source of truth.
//! Every mutation that touches it is a single conditional statement so the
//! check and the write cannot race a concurrent borrow.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookWithActiveCount, CreateBook, PopularBook, UpdateBook},
        borrowing::Borrowing,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List all books with their active borrowing counts
    pub async fn list_with_active_counts(&self) -> AppResult<Vec<BookWithActiveCount>> {
        let books = sqlx::query_as::<_, BookWithActiveCount>(
            r#"
            SELECT b.*,
                   (SELECT COUNT(*) FROM borrowings br
                    WHERE br.book_id = b.id AND br.status = 'borrowed') as active_borrowings_count
            FROM books b
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Get the most recent borrowings of a book, newest first
    pub async fn get_recent_borrowings(&self, book_id: i32, limit: i64) -> AppResult<Vec<Borrowing>> {
        let borrowings = sqlx::query_as::<_, Borrowing>(
            "SELECT * FROM borrowings WHERE book_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(book_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(borrowings)
    }

    /// Check whether an ISBN is already registered, optionally excluding one book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new book. All copies start out available.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, publisher, publication_year,
                               stock, available, description, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(book.stock)
        .bind(&book.description)
        .bind(&book.cover_image)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book. When `stock` is present, `available` is recomputed from
    /// the live active-borrowing count in the same statement, floored at zero.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                publisher = COALESCE($5, publisher),
                publication_year = COALESCE($6, publication_year),
                stock = COALESCE($7, stock),
                available = CASE
                    WHEN $7::int IS NULL THEN available
                    ELSE GREATEST(0, $7 - (SELECT COUNT(*)::int FROM borrowings br
                                           WHERE br.book_id = books.id AND br.status = 'borrowed'))
                END,
                description = COALESCE($8, description),
                cover_image = COALESCE($9, cover_image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(book.stock)
        .bind(&book.description)
        .bind(&book.cover_image)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(updated)
    }

    /// Delete a book unless it still has active borrowings. The guard lives
    /// in the DELETE itself so it cannot race a concurrent borrow.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        // Distinguish 404 from the business-rule rejection
        self.get_by_id(id).await?;

        let result = sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM borrowings br
                              WHERE br.book_id = $1 AND br.status = 'borrowed')
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::BusinessRule(
                "Cannot delete book with active borrowings".to_string(),
            ));
        }

        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Most borrowed books of all time. Ties break by id ascending so the
    /// ranking is deterministic.
    pub async fn popular(&self, limit: i64) -> AppResult<Vec<PopularBook>> {
        let books = sqlx::query_as::<_, PopularBook>(
            r#"
            SELECT b.*,
                   (SELECT COUNT(*) FROM borrowings br WHERE br.book_id = b.id) as borrowings_count
            FROM books b
            ORDER BY borrowings_count DESC, b.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}
