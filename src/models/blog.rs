//! Blog model
//!
//! - `Blog` entity with its category and total read count
//! - `BlogFilter` selecting which blogs a list page shows
//! - `BlogDate` month archive entries

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::BlogType;

/// Blog entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    /// Category the blog is filed under
    pub blog_type: BlogType,
    pub content: String,
    pub author: String,
    pub created_time: DateTime<Utc>,
    pub last_updated_time: DateTime<Utc>,
    /// Total reads, 0 when never counted
    #[serde(default)]
    pub read_num: i64,
}

/// Input for creating a blog
#[derive(Debug, Clone)]
pub struct CreateBlogInput {
    pub title: String,
    pub blog_type_id: i64,
    pub content: String,
    pub author: String,
    /// Creation time; `None` means now
    pub created_time: Option<DateTime<Utc>>,
}

impl CreateBlogInput {
    pub fn new(
        title: impl Into<String>,
        blog_type_id: i64,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            blog_type_id,
            content: content.into(),
            author: author.into(),
            created_time: None,
        }
    }

    /// Set an explicit creation time
    pub fn created_at(mut self, created_time: DateTime<Utc>) -> Self {
        self.created_time = Some(created_time);
        self
    }
}

/// Which blogs a list page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogFilter {
    All,
    Type(i64),
    /// Blogs created in a calendar month (UTC)
    Month { year: i32, month: u32 },
}

impl BlogFilter {
    /// Half-open UTC range `[start, end)` covered by a month filter.
    ///
    /// `None` for non-month filters and for months that do not exist,
    /// which callers treat as an empty selection.
    pub fn month_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let BlogFilter::Month { year, month } = *self else {
            return None;
        };
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some((
            Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?),
            Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0)?),
        ))
    }
}

/// A month that has blogs, for the archive sidebar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlogDate {
    pub year: i32,
    pub month: u32,
    pub blog_count: i64,
}
