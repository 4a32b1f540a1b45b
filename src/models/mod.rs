//! Data models
//!
//! Database entities (Blog, BlogType, ReadNum, ReadDetail) and the derived
//! rows the views render (hot lists, month archive entries).

mod blog;
mod blog_type;
mod read_stats;

pub use blog::{Blog, BlogDate, BlogFilter, CreateBlogInput};
pub use blog_type::{BlogType, BlogTypeWithCount};
pub use read_stats::{DailyHotBlog, HotBlog, ReadDetail};
