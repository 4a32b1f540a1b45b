//! Database repositories
//!
//! Repository traits and their sqlx implementations, one per aggregate.

pub mod blog;
pub mod blog_type;
pub mod read_stats;

pub use blog::{BlogRepository, SqlxBlogRepository};
pub use blog_type::{BlogTypeRepository, SqlxBlogTypeRepository};
pub use read_stats::{ReadStatsRepository, SqlxReadStatsRepository};
