//! Blog pages
//!
//! - `GET /blog/` all blogs
//! - `GET /blog/type/{blog_type_pk}` blogs of one category
//! - `GET /blog/date/{year}/{month}` blogs of one month
//! - `GET /blog/{blog_pk}` a single blog, counting the read once per browser

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use futures::TryFutureExt;
use tera::Context as TeraContext;

use super::common::{parse_path_number, PageQuery};
use super::middleware::{AppState, WebError};
use crate::models::BlogFilter;
use crate::services::{blogs_with_date_title, today};

/// GET /blog/
pub async fn blog_list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let (data, (dates, read_nums), hot_blogs_for_7_days, hot_blogs_for_30_days) = futures::try_join!(
        state
            .blog_service
            .blog_list_common_data(BlogFilter::All, query.page.as_deref())
            .err_into::<WebError>(),
        state
            .read_statistics_service
            .get_seven_days_read_data(today())
            .err_into::<WebError>(),
        state
            .hot_blog_service
            .cached_7_days_hot_blogs()
            .err_into::<WebError>(),
        state
            .hot_blog_service
            .get_30_days_hot_blogs()
            .err_into::<WebError>(),
    )?;

    let mut context = TeraContext::from_serialize(&data)?;
    context.insert("dates", &dates);
    context.insert("read_nums", &read_nums);
    context.insert("hot_blogs_for_7_days", &hot_blogs_for_7_days);
    context.insert("get_30_days_hot_blogs", &hot_blogs_for_30_days);

    Ok(Html(state.theme_engine.render("blog/blog_list.html", &context)?))
}

/// GET /blog/type/{blog_type_pk}
pub async fn blogs_with_type(
    State(state): State<AppState>,
    Path(blog_type_pk): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let blog_type_id: i64 = parse_path_number(&blog_type_pk)?;
    let blog_type = state.blog_service.get_blog_type(blog_type_id).await?;

    let (data, hot_blogs_for_30_days) = futures::try_join!(
        state
            .blog_service
            .blog_list_common_data(BlogFilter::Type(blog_type.id), query.page.as_deref())
            .err_into::<WebError>(),
        state
            .hot_blog_service
            .get_30_days_hot_blogs()
            .err_into::<WebError>(),
    )?;

    let mut context = TeraContext::from_serialize(&data)?;
    context.insert("blog_type", &blog_type);
    context.insert("get_30_days_hot_blogs", &hot_blogs_for_30_days);

    Ok(Html(state.theme_engine.render("blog/blogs_with_type.html", &context)?))
}

/// GET /blog/date/{year}/{month}
///
/// A month outside 1..=12 shows an empty list rather than an error.
pub async fn blogs_with_date(
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let year: i32 = parse_path_number(&year)?;
    let month: u32 = parse_path_number(&month)?;

    let (data, hot_blogs_for_30_days) = futures::try_join!(
        state
            .blog_service
            .blog_list_common_data(BlogFilter::Month { year, month }, query.page.as_deref())
            .err_into::<WebError>(),
        state
            .hot_blog_service
            .get_30_days_hot_blogs()
            .err_into::<WebError>(),
    )?;

    let mut context = TeraContext::from_serialize(&data)?;
    context.insert("blogs_with_date", &blogs_with_date_title(year, month));
    context.insert("get_30_days_hot_blogs", &hot_blogs_for_30_days);

    Ok(Html(state.theme_engine.render("blog/blogs_with_date.html", &context)?))
}

/// GET /blog/{blog_pk}
///
/// Always sets the read cookie, whether or not this request was counted.
pub async fn blog_detail(
    State(state): State<AppState>,
    Path(blog_pk): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), WebError> {
    let blog_id: i64 = parse_path_number(&blog_pk)?;
    let blog = state.blog_service.get_blog(blog_id).await?;

    let read_cookie_key = state
        .read_statistics_service
        .read_statistics_once_read(&jar, blog.id)
        .await?;

    let (previous_blog, next_blog) = futures::try_join!(
        state.blog_service.previous_blog(&blog),
        state.blog_service.next_blog(&blog),
    )?;

    let mut context = TeraContext::new();
    context.insert("blog", &blog);
    context.insert("previous_blog", &previous_blog);
    context.insert("next_blog", &next_blog);

    let html = state.theme_engine.render("blog/blog_detail.html", &context)?;

    let cookie = Cookie::build((read_cookie_key, "true")).path("/");

    Ok((jar.add(cookie), Html(html)))
}
