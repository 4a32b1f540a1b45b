//! Shared state, the page error type and the error page middleware

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::cache::Cache;
use crate::db::repositories::{SqlxBlogRepository, SqlxBlogTypeRepository, SqlxReadStatsRepository};
use crate::db::DynDatabasePool;
use crate::services::{BlogService, BlogServiceError, HotBlogService, ReadStatisticsService};
use crate::theme::{ThemeEngine, ThemeError};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub blog_service: Arc<BlogService>,
    pub hot_blog_service: Arc<HotBlogService>,
    pub read_statistics_service: Arc<ReadStatisticsService>,
    pub theme_engine: Arc<ThemeEngine>,
}

impl AppState {
    /// Wire the services over one database pool and cache
    pub fn new(
        pool: DynDatabasePool,
        cache: Arc<Cache>,
        theme_engine: ThemeEngine,
        each_page_blogs_number: u32,
    ) -> Self {
        let read_stats_repo = SqlxReadStatsRepository::boxed(pool.clone());

        Self {
            blog_service: Arc::new(BlogService::new(
                SqlxBlogRepository::boxed(pool.clone()),
                SqlxBlogTypeRepository::boxed(pool),
                each_page_blogs_number,
            )),
            hot_blog_service: Arc::new(HotBlogService::new(read_stats_repo.clone(), cache)),
            read_statistics_service: Arc::new(ReadStatisticsService::new(read_stats_repo)),
            theme_engine: Arc::new(theme_engine),
        }
    }
}

/// Error returned by page handlers
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<BlogServiceError> for WebError {
    fn from(e: BlogServiceError) -> Self {
        match e {
            BlogServiceError::BlogNotFound(_) | BlogServiceError::BlogTypeNotFound(_) => {
                WebError::NotFound(e.to_string())
            }
            BlogServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<ThemeError> for WebError {
    fn from(e: ThemeError) -> Self {
        WebError::Internal(e.into())
    }
}

impl From<tera::Error> for WebError {
    fn from(e: tera::Error) -> Self {
        WebError::Internal(e.into())
    }
}

/// Marks a response to be replaced by a rendered error page
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let page = match self {
            WebError::NotFound(message) => ErrorPage {
                status: StatusCode::NOT_FOUND,
                message,
            },
            WebError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                ErrorPage {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "服务器内部错误，请稍后再试".to_string(),
                }
            }
        };

        let mut response = (page.status, page.message.clone()).into_response();
        response.extensions_mut().insert(page);
        response
    }
}

/// Render `error.html` for responses produced from a [`WebError`]
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let title = page.status.canonical_reason().unwrap_or("Error");
    let html = state
        .theme_engine
        .render_error_page(page.status.as_u16(), title, &page.message);
    (page.status, Html(html)).into_response()
}

/// Fallback for paths no route matches
pub async fn not_found(uri: axum::http::Uri) -> WebError {
    WebError::NotFound(format!("Page not found: {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status() {
        let not_found: WebError = BlogServiceError::BlogNotFound(3).into();
        let type_not_found: WebError = BlogServiceError::BlogTypeNotFound(3).into();
        let internal: WebError = BlogServiceError::InternalError(anyhow::anyhow!("boom")).into();

        assert!(matches!(not_found, WebError::NotFound(_)));
        assert!(matches!(type_not_found, WebError::NotFound(_)));
        assert!(matches!(internal, WebError::Internal(_)));
    }

    #[test]
    fn test_error_response_carries_page() {
        let response = WebError::NotFound("Blog not found: 3".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let page = response.extensions().get::<ErrorPage>().unwrap();
        assert_eq!(page.message, "Blog not found: 3");
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = WebError::Internal(anyhow::anyhow!("database is on fire")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let page = response.extensions().get::<ErrorPage>().unwrap();
        assert!(!page.message.contains("database"));
    }
}
