//! Read statistics
//!
//! Counts a blog read at most once per browser, using a marker cookie the
//! detail page sets, and summarizes reads for the home page chart and
//! daily hot lists.

use crate::db::repositories::ReadStatsRepository;
use crate::models::DailyHotBlog;
use anyhow::Result;
use axum_extra::extract::CookieJar;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;

use super::hot_blogs::{today, HOT_BLOGS_LIMIT};

/// Name of the cookie marking a blog as already read
pub fn read_cookie_key(blog_id: i64) -> String {
    format!("blog_{}_read", blog_id)
}

pub struct ReadStatisticsService {
    repo: Arc<dyn ReadStatsRepository>,
}

impl ReadStatisticsService {
    pub fn new(repo: Arc<dyn ReadStatsRepository>) -> Self {
        Self { repo }
    }

    /// Count one read of `blog_id` unless the request already carries its
    /// read cookie, returning the cookie key to set on the response
    pub async fn read_statistics_once_read(
        &self,
        cookies: &CookieJar,
        blog_id: i64,
    ) -> Result<String> {
        self.read_statistics_once_read_on(cookies, blog_id, today()).await
    }

    pub async fn read_statistics_once_read_on(
        &self,
        cookies: &CookieJar,
        blog_id: i64,
        today: NaiveDate,
    ) -> Result<String> {
        let key = read_cookie_key(blog_id);
        let already_read = cookies
            .get(&key)
            .is_some_and(|cookie| !cookie.value().is_empty());

        if already_read {
            tracing::debug!("Blog {} already read by this client", blog_id);
        } else {
            self.repo.add_reads(blog_id, today, 1).await?;
        }

        Ok(key)
    }

    /// Total reads of all blogs on each of the 7 days before `today`,
    /// oldest first, as `(labels, counts)` with `MM/DD` labels
    pub async fn get_seven_days_read_data(
        &self,
        today: NaiveDate,
    ) -> Result<(Vec<String>, Vec<i64>)> {
        let start = today - Duration::days(7);
        let sums: HashMap<NaiveDate, i64> = self
            .repo
            .read_sums_between(start, today)
            .await?
            .into_iter()
            .collect();

        let (dates, read_nums) = (1..=7)
            .rev()
            .map(|i| {
                let date = today - Duration::days(i);
                (
                    date.format("%m/%d").to_string(),
                    sums.get(&date).copied().unwrap_or(0),
                )
            })
            .unzip();

        Ok((dates, read_nums))
    }

    /// Most-read blogs of `today`
    pub async fn get_today_hot_data(&self, today: NaiveDate) -> Result<Vec<DailyHotBlog>> {
        self.repo.hot_blogs_on(today, HOT_BLOGS_LIMIT).await
    }

    /// Most-read blogs of the day before `today`
    pub async fn get_yesterday_hot_data(&self, today: NaiveDate) -> Result<Vec<DailyHotBlog>> {
        self.repo
            .hot_blogs_on(today - Duration::days(1), HOT_BLOGS_LIMIT)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        BlogRepository, BlogTypeRepository, SqlxBlogRepository, SqlxBlogTypeRepository,
        SqlxReadStatsRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Blog, CreateBlogInput};
    use axum::http::{header, HeaderMap, HeaderValue};
    use axum_extra::extract::cookie::Cookie;

    async fn setup(n: usize) -> (Arc<dyn ReadStatsRepository>, ReadStatisticsService, Vec<Blog>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let blog_type = SqlxBlogTypeRepository::new(pool.clone()).create("Rust").await.unwrap();
        let blog_repo = SqlxBlogRepository::new(pool.clone());
        let mut blogs = Vec::new();
        for i in 0..n {
            blogs.push(
                blog_repo
                    .create(&CreateBlogInput::new(format!("blog {}", i), blog_type.id, "body", "admin"))
                    .await
                    .unwrap(),
            );
        }

        let repo = SqlxReadStatsRepository::boxed(pool);
        (repo.clone(), ReadStatisticsService::new(repo), blogs)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_read_cookie_key() {
        assert_eq!(read_cookie_key(42), "blog_42_read");
    }

    #[tokio::test]
    async fn test_first_read_is_counted() {
        let (repo, service, blogs) = setup(1).await;
        let today = day("2024-01-10");

        let key = service
            .read_statistics_once_read_on(&CookieJar::new(), blogs[0].id, today)
            .await
            .unwrap();

        assert_eq!(key, read_cookie_key(blogs[0].id));
        assert_eq!(repo.total_reads(blogs[0].id).await.unwrap(), 1);
        assert_eq!(repo.get_detail(blogs[0].id, today).await.unwrap().unwrap().read_num, 1);
    }

    #[tokio::test]
    async fn test_read_with_cookie_is_not_counted() {
        let (repo, service, blogs) = setup(1).await;
        let blog_id = blogs[0].id;
        let cookies = CookieJar::new().add(Cookie::new(read_cookie_key(blog_id), "true"));

        let key = service
            .read_statistics_once_read_on(&cookies, blog_id, day("2024-01-10"))
            .await
            .unwrap();

        assert_eq!(key, read_cookie_key(blog_id));
        assert_eq!(repo.total_reads(blog_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cookie_of_another_blog_still_counts() {
        let (repo, service, blogs) = setup(2).await;
        let cookies = CookieJar::new().add(Cookie::new(read_cookie_key(blogs[1].id), "true"));

        service
            .read_statistics_once_read_on(&cookies, blogs[0].id, day("2024-01-10"))
            .await
            .unwrap();

        assert_eq!(repo.total_reads(blogs[0].id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_cookie_value_counts() {
        let (repo, service, blogs) = setup(1).await;
        let cookies = CookieJar::new().add(Cookie::new(read_cookie_key(blogs[0].id), ""));

        service
            .read_statistics_once_read_on(&cookies, blogs[0].id, day("2024-01-10"))
            .await
            .unwrap();

        assert_eq!(repo.total_reads(blogs[0].id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cookie_header_among_others_is_honoured() {
        let (repo, service, blogs) = setup(1).await;
        let blog_id = blogs[0].id;
        let mut headers = HeaderMap::new();
        let raw = format!("theme=dark; {}=true; lang=zh", read_cookie_key(blog_id));
        headers.insert(header::COOKIE, HeaderValue::from_str(&raw).unwrap());

        let jar = CookieJar::from_headers(&headers);

        service
            .read_statistics_once_read_on(&jar, blog_id, day("2024-01-10"))
            .await
            .unwrap();

        assert_eq!(repo.total_reads(blog_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seven_days_read_data() {
        let (repo, service, blogs) = setup(2).await;
        repo.add_reads(blogs[0].id, day("2024-01-03"), 5).await.unwrap();
        repo.add_reads(blogs[1].id, day("2024-01-03"), 1).await.unwrap();
        repo.add_reads(blogs[0].id, day("2024-01-09"), 10).await.unwrap();
        repo.add_reads(blogs[0].id, day("2024-01-10"), 100).await.unwrap();
        repo.add_reads(blogs[0].id, day("2024-01-02"), 100).await.unwrap();

        let (dates, read_nums) = service.get_seven_days_read_data(day("2024-01-10")).await.unwrap();

        assert_eq!(
            dates,
            vec!["01/03", "01/04", "01/05", "01/06", "01/07", "01/08", "01/09"]
        );
        assert_eq!(read_nums, vec![6, 0, 0, 0, 0, 0, 10]);
    }

    #[tokio::test]
    async fn test_today_and_yesterday_hot_data() {
        let (repo, service, blogs) = setup(3).await;
        let today = day("2024-01-10");
        repo.add_reads(blogs[0].id, today, 3).await.unwrap();
        repo.add_reads(blogs[1].id, today, 9).await.unwrap();
        repo.add_reads(blogs[2].id, day("2024-01-09"), 4).await.unwrap();

        let today_hot = service.get_today_hot_data(today).await.unwrap();
        let yesterday_hot = service.get_yesterday_hot_data(today).await.unwrap();

        assert_eq!(
            today_hot.iter().map(|h| (h.blog_id, h.read_num)).collect::<Vec<_>>(),
            vec![(blogs[1].id, 9), (blogs[0].id, 3)]
        );
        assert_eq!(yesterday_hot.len(), 1);
        assert_eq!(yesterday_hot[0].blog_id, blogs[2].id);
        assert_eq!(yesterday_hot[0].date, day("2024-01-09"));
    }
}
