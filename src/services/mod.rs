//! Business logic services

pub mod books;
pub mod borrowings;
pub mod dashboard;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub borrowings: borrowings::BorrowingsService,
    pub users: users::UsersService,
    pub dashboard: dashboard::DashboardService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            borrowings: borrowings::BorrowingsService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            dashboard: dashboard::DashboardService::new(repository),
        }
    }
}
