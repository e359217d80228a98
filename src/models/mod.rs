//! Data models for Biblios

pub mod book;
pub mod borrowing;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDetails, BookWithActiveCount, PopularBook};
pub use borrowing::{Borrowing, BorrowingDetails, BorrowingStatus};
pub use user::{User, UserSummary};
