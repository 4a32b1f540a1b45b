//! Database layer
//!
//! SQLite (default) or MySQL behind the `DatabasePool` trait, embedded
//! migrations, and the repositories the services read through.
//!
//! ```ignore
//! use tidings::config::DatabaseConfig;
//! use tidings::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
