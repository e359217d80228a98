//! Biblios Library Management System
//!
//! A Rust REST backend for tracking books, borrowers, and borrowing
//! transactions, with availability bookkeeping and a dashboard read model.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: Arc<repository::Repository>,
    pub services: Arc<services::Services>,
}
