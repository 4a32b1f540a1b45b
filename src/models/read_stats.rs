//! Read statistics models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reads of one blog on one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadDetail {
    pub blog_id: i64,
    pub date: NaiveDate,
    pub read_num: i64,
}

/// One entry of a windowed hot list: a blog and its summed reads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HotBlog {
    pub id: i64,
    pub title: String,
    pub read_num_sum: i64,
}

/// One entry of a single-day hot list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyHotBlog {
    pub blog_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub read_num: i64,
}
