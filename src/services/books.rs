//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDetails, BookWithActiveCount, CreateBook, UpdateBook},
    repository::Repository,
};

/// Number of recent borrowings shown on a book's detail view
const RECENT_BORROWINGS: i64 = 5;

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books with their active borrowing counts
    pub async fn list_books(&self) -> AppResult<Vec<BookWithActiveCount>> {
        self.repository.books.list_with_active_counts().await
    }

    /// Get a book with its most recent borrowings
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let borrowings = self
            .repository
            .books
            .get_recent_borrowings(id, RECENT_BORROWINGS)
            .await?;

        Ok(BookDetails { book, borrowings })
    }

    /// Create a new book. ISBN must be unique across the catalog.
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::field("isbn", "The isbn has already been taken"));
        }

        self.repository.books.create(&book).await
    }

    /// Update a book. A stock change recomputes availability from the live
    /// active-borrowing count; a caller-supplied `available` is never applied.
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::field("isbn", "The isbn has already been taken"));
            }
        }

        self.repository.books.update(id, &book).await
    }

    /// Delete a book. Rejected while it has active borrowings.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
