//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::*;
