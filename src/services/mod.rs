//! Services layer
//!
//! Business logic between the repositories and the web handlers: list
//! pagination, hot blog rankings (with the cached 7-day list) and read
//! statistics.

pub mod blog;
pub mod hot_blogs;
pub mod pagination;
pub mod read_statistics;

pub use blog::{blogs_with_date_title, BlogListData, BlogService, BlogServiceError};
pub use hot_blogs::{
    today, HotBlogService, HOT_BLOGS_CACHE_TTL_SECS, HOT_BLOGS_FOR_7_DAYS_KEY, HOT_BLOGS_LIMIT,
};
pub use pagination::{page_range, Page, PageItem, Paginator};
pub use read_statistics::{read_cookie_key, ReadStatisticsService};
