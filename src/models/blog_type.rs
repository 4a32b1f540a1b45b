//! Blog category model

use serde::{Deserialize, Serialize};

/// A blog category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlogType {
    pub id: i64,
    pub type_name: String,
}

/// A category together with the number of blogs filed under it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlogTypeWithCount {
    #[serde(flatten)]
    pub blog_type: BlogType,
    pub blog_count: i64,
}
