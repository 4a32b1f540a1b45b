//! Web layer - HTML page handlers and routing

pub mod blog;
pub mod common;
pub mod home;
pub mod middleware;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

pub use middleware::{AppState, WebError};

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home))
        .route("/blog", get(blog::blog_list))
        .route("/blog/", get(blog::blog_list))
        .route("/blog/type/{blog_type_pk}", get(blog::blogs_with_type))
        .route("/blog/date/{year}/{month}", get(blog::blogs_with_date))
        .route("/blog/{blog_pk}", get(blog::blog_detail))
        .fallback(middleware::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::render_error_pages,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
