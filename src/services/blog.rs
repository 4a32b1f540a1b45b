//! Blog service
//!
//! Read side of blogs and categories:
//! - paginated lists (all, per category, per month) with the sidebar data
//!   every list page shows
//! - single blog lookup with its newer and older neighbours

use crate::db::repositories::{BlogRepository, BlogTypeRepository};
use crate::models::{Blog, BlogDate, BlogFilter, BlogType, BlogTypeWithCount};
use serde::Serialize;
use std::sync::Arc;

use super::pagination::{page_range, Page, PageItem, Paginator};

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    #[error("Blog not found: {0}")]
    BlogNotFound(i64),

    #[error("Blog type not found: {0}")]
    BlogTypeNotFound(i64),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Data shared by every blog list page
#[derive(Debug, Clone, Serialize)]
pub struct BlogListData {
    /// Blogs on the requested page
    pub blogs: Vec<Blog>,
    pub page_of_blogs: Page,
    pub page_range: Vec<PageItem>,
    pub blog_types: Vec<BlogTypeWithCount>,
    pub blog_dates: Vec<BlogDate>,
}

pub struct BlogService {
    blogs: Arc<dyn BlogRepository>,
    blog_types: Arc<dyn BlogTypeRepository>,
    per_page: i64,
}

impl BlogService {
    pub fn new(
        blogs: Arc<dyn BlogRepository>,
        blog_types: Arc<dyn BlogTypeRepository>,
        per_page: u32,
    ) -> Self {
        Self {
            blogs,
            blog_types,
            per_page: i64::from(per_page),
        }
    }

    /// Build the list page data for `filter`.
    ///
    /// `raw_page` is the unparsed `page` query value; see
    /// [`Paginator::get_page`] for how bad values are resolved.
    pub async fn blog_list_common_data(
        &self,
        filter: BlogFilter,
        raw_page: Option<&str>,
    ) -> Result<BlogListData, BlogServiceError> {
        let count = self.blogs.count(filter).await?;
        let page = Paginator::new(count, self.per_page).get_page(raw_page);

        let (blogs, blog_types, blog_dates) = futures::try_join!(
            self.blogs.list(filter, page.offset, page.limit),
            self.blog_types.list_with_count(),
            self.blogs.list_dates(),
        )?;

        Ok(BlogListData {
            blogs,
            page_range: page_range(page.number, page.num_pages),
            page_of_blogs: page,
            blog_types,
            blog_dates,
        })
    }

    pub async fn get_blog_type(&self, id: i64) -> Result<BlogType, BlogServiceError> {
        self.blog_types
            .get_by_id(id)
            .await?
            .ok_or(BlogServiceError::BlogTypeNotFound(id))
    }

    pub async fn get_blog(&self, id: i64) -> Result<Blog, BlogServiceError> {
        self.blogs
            .get_by_id(id)
            .await?
            .ok_or(BlogServiceError::BlogNotFound(id))
    }

    /// The nearest blog created after `blog`
    pub async fn previous_blog(&self, blog: &Blog) -> Result<Option<Blog>, BlogServiceError> {
        Ok(self.blogs.get_newer(blog.created_time).await?)
    }

    /// The nearest blog created before `blog`
    pub async fn next_blog(&self, blog: &Blog) -> Result<Option<Blog>, BlogServiceError> {
        Ok(self.blogs.get_older(blog.created_time).await?)
    }
}

/// Heading of a month archive page, e.g. `2024年1月`
pub fn blogs_with_date_title(year: i32, month: u32) -> String {
    format!("{}年{}月", year, month)
}
