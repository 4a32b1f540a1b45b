//! Home page: the 7-day read chart and the daily and weekly hot lists

use axum::{extract::State, response::Html};
use tera::Context as TeraContext;

use super::middleware::{AppState, WebError};
use crate::services::today;

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let today = today();
    let stats = &state.read_statistics_service;

    let ((dates, read_nums), today_hot_data, yesterday_hot_data, hot_blogs_for_7_days) = futures::try_join!(
        stats.get_seven_days_read_data(today),
        stats.get_today_hot_data(today),
        stats.get_yesterday_hot_data(today),
        state.hot_blog_service.cached_7_days_hot_blogs_on(today),
    )?;

    let mut context = TeraContext::new();
    context.insert("dates", &dates);
    context.insert("read_nums", &read_nums);
    context.insert("today_hot_data", &today_hot_data);
    context.insert("yesterday_hot_data", &yesterday_hot_data);
    context.insert("hot_blogs_for_7_days", &hot_blogs_for_7_days);

    Ok(Html(state.theme_engine.render("home.html", &context)?))
}
