//! Blog repository
//!
//! Blogs are always returned newest first (`created_time DESC, id DESC`)
//! together with their category and total read count.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Blog, BlogDate, BlogFilter, BlogType, CreateBlogInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn create(&self, input: &CreateBlogInput) -> Result<Blog>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>>;

    /// Number of blogs matching the filter
    async fn count(&self, filter: BlogFilter) -> Result<i64>;

    /// One slice of the blogs matching the filter, newest first
    async fn list(&self, filter: BlogFilter, offset: i64, limit: i64) -> Result<Vec<Blog>>;

    /// The oldest blog created strictly after `created_time`
    async fn get_newer(&self, created_time: DateTime<Utc>) -> Result<Option<Blog>>;

    /// The newest blog created strictly before `created_time`
    async fn get_older(&self, created_time: DateTime<Utc>) -> Result<Option<Blog>>;

    /// Months that have blogs, newest first, with their blog counts
    async fn list_dates(&self) -> Result<Vec<BlogDate>>;
}

pub struct SqlxBlogRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

const BLOG_SELECT: &str = r#"
    SELECT b.id, b.title, b.content, b.author, b.created_time, b.last_updated_time,
           t.id AS blog_type_id, t.type_name,
           COALESCE(r.read_num, 0) AS read_num
    FROM blogs b
    INNER JOIN blog_types t ON t.id = b.blog_type_id
    LEFT JOIN read_nums r ON r.blog_id = b.id
"#;

const NEWEST_FIRST: &str = "ORDER BY b.created_time DESC, b.id DESC";

/// WHERE clause and bind values for a list filter
enum FilterSql {
    All,
    Type(i64),
    Range(DateTime<Utc>, DateTime<Utc>),
    /// Matches nothing, e.g. month 13
    Nothing,
}

impl FilterSql {
    fn from_filter(filter: BlogFilter) -> Self {
        match filter {
            BlogFilter::All => FilterSql::All,
            BlogFilter::Type(id) => FilterSql::Type(id),
            BlogFilter::Month { .. } => match filter.month_range() {
                Some((start, end)) => FilterSql::Range(start, end),
                None => FilterSql::Nothing,
            },
        }
    }

    fn clause(&self) -> &'static str {
        match self {
            FilterSql::All | FilterSql::Nothing => "",
            FilterSql::Type(_) => "WHERE b.blog_type_id = ?",
            FilterSql::Range(..) => "WHERE b.created_time >= ? AND b.created_time < ?",
        }
    }
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn create(&self, input: &CreateBlogInput) -> Result<Blog> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => create_blog_sqlite(self.pool.sqlite()?, input).await?,
            DatabaseDriver::Mysql => create_blog_mysql(self.pool.mysql()?, input).await?,
        };

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Blog {} not found after insert", id))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>> {
        let sql = format!("{} WHERE b.id = ?", BLOG_SELECT);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get blog by ID")?;
                row.as_ref().map(row_to_blog_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get blog by ID")?;
                row.as_ref().map(row_to_blog_mysql).transpose()
            }
        }
    }

    async fn count(&self, filter: BlogFilter) -> Result<i64> {
        let filter = FilterSql::from_filter(filter);
        if let FilterSql::Nothing = filter {
            return Ok(0);
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_blogs_sqlite(self.pool.sqlite()?, &filter).await,
            DatabaseDriver::Mysql => count_blogs_mysql(self.pool.mysql()?, &filter).await,
        }
    }

    async fn list(&self, filter: BlogFilter, offset: i64, limit: i64) -> Result<Vec<Blog>> {
        let filter = FilterSql::from_filter(filter);
        if let FilterSql::Nothing = filter {
            return Ok(Vec::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_blogs_sqlite(self.pool.sqlite()?, &filter, offset, limit).await
            }
            DatabaseDriver::Mysql => {
                list_blogs_mysql(self.pool.mysql()?, &filter, offset, limit).await
            }
        }
    }

    async fn get_newer(&self, created_time: DateTime<Utc>) -> Result<Option<Blog>> {
        let sql = format!(
            "{} WHERE b.created_time > ? ORDER BY b.created_time ASC, b.id ASC LIMIT 1",
            BLOG_SELECT
        );
        self.fetch_neighbour(&sql, created_time).await
    }

    async fn get_older(&self, created_time: DateTime<Utc>) -> Result<Option<Blog>> {
        let sql = format!(
            "{} WHERE b.created_time < ? {} LIMIT 1",
            BLOG_SELECT, NEWEST_FIRST
        );
        self.fetch_neighbour(&sql, created_time).await
    }

    async fn list_dates(&self) -> Result<Vec<BlogDate>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_dates_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_dates_mysql(self.pool.mysql()?).await,
        }
    }
}

impl SqlxBlogRepository {
    async fn fetch_neighbour(&self, sql: &str, created_time: DateTime<Utc>) -> Result<Option<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(sql)
                    .bind(created_time)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get neighbouring blog")?;
                row.as_ref().map(row_to_blog_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(sql)
                    .bind(created_time)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get neighbouring blog")?;
                row.as_ref().map(row_to_blog_mysql).transpose()
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_blog_sqlite(pool: &SqlitePool, input: &CreateBlogInput) -> Result<i64> {
    let now = Utc::now();
    let created_time = input.created_time.unwrap_or(now);

    let result = sqlx::query(
        r#"
        INSERT INTO blogs (title, blog_type_id, content, author, created_time, last_updated_time)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(input.blog_type_id)
    .bind(&input.content)
    .bind(&input.author)
    .bind(created_time)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create blog")?;

    Ok(result.last_insert_rowid())
}

async fn count_blogs_sqlite(pool: &SqlitePool, filter: &FilterSql) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM blogs b {}", filter.clause());
    let query = sqlx::query_scalar(&sql);
    let query = match filter {
        FilterSql::Type(id) => query.bind(*id),
        FilterSql::Range(start, end) => query.bind(*start).bind(*end),
        FilterSql::All | FilterSql::Nothing => query,
    };

    query.fetch_one(pool).await.context("Failed to count blogs")
}

async fn list_blogs_sqlite(
    pool: &SqlitePool,
    filter: &FilterSql,
    offset: i64,
    limit: i64,
) -> Result<Vec<Blog>> {
    let sql = format!(
        "{} {} {} LIMIT ? OFFSET ?",
        BLOG_SELECT,
        filter.clause(),
        NEWEST_FIRST
    );
    let query = sqlx::query(&sql);
    let query = match filter {
        FilterSql::Type(id) => query.bind(*id),
        FilterSql::Range(start, end) => query.bind(*start).bind(*end),
        FilterSql::All | FilterSql::Nothing => query,
    };

    let rows = query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list blogs")?;

    rows.iter().map(row_to_blog_sqlite).collect()
}

async fn list_dates_sqlite(pool: &SqlitePool) -> Result<Vec<BlogDate>> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(strftime('%Y', created_time) AS INTEGER) AS year,
               CAST(strftime('%m', created_time) AS INTEGER) AS month,
               COUNT(*) AS blog_count
        FROM blogs
        GROUP BY year, month
        ORDER BY year DESC, month DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list blog dates")?;

    rows.iter()
        .map(|row| {
            blog_date(
                row.try_get("year")?,
                row.try_get("month")?,
                row.try_get("blog_count")?,
            )
        })
        .collect()
}

fn row_to_blog_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Blog> {
    Ok(Blog {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        blog_type: BlogType {
            id: row.try_get("blog_type_id")?,
            type_name: row.try_get("type_name")?,
        },
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        created_time: row.try_get("created_time")?,
        last_updated_time: row.try_get("last_updated_time")?,
        read_num: row.try_get("read_num")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_blog_mysql(pool: &MySqlPool, input: &CreateBlogInput) -> Result<i64> {
    let now = Utc::now();
    let created_time = input.created_time.unwrap_or(now);

    let result = sqlx::query(
        r#"
        INSERT INTO blogs (title, blog_type_id, content, author, created_time, last_updated_time)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(input.blog_type_id)
    .bind(&input.content)
    .bind(&input.author)
    .bind(created_time)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create blog")?;

    Ok(result.last_insert_id() as i64)
}

async fn count_blogs_mysql(pool: &MySqlPool, filter: &FilterSql) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM blogs b {}", filter.clause());
    let query = sqlx::query_scalar(&sql);
    let query = match filter {
        FilterSql::Type(id) => query.bind(*id),
        FilterSql::Range(start, end) => query.bind(*start).bind(*end),
        FilterSql::All | FilterSql::Nothing => query,
    };

    query.fetch_one(pool).await.context("Failed to count blogs")
}

async fn list_blogs_mysql(
    pool: &MySqlPool,
    filter: &FilterSql,
    offset: i64,
    limit: i64,
) -> Result<Vec<Blog>> {
    let sql = format!(
        "{} {} {} LIMIT ? OFFSET ?",
        BLOG_SELECT,
        filter.clause(),
        NEWEST_FIRST
    );
    let query = sqlx::query(&sql);
    let query = match filter {
        FilterSql::Type(id) => query.bind(*id),
        FilterSql::Range(start, end) => query.bind(*start).bind(*end),
        FilterSql::All | FilterSql::Nothing => query,
    };

    let rows = query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list blogs")?;

    rows.iter().map(row_to_blog_mysql).collect()
}

async fn list_dates_mysql(pool: &MySqlPool) -> Result<Vec<BlogDate>> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(YEAR(created_time) AS SIGNED) AS year,
               CAST(MONTH(created_time) AS SIGNED) AS month,
               COUNT(*) AS blog_count
        FROM blogs
        GROUP BY year, month
        ORDER BY year DESC, month DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list blog dates")?;

    rows.iter()
        .map(|row| {
            blog_date(
                row.try_get("year")?,
                row.try_get("month")?,
                row.try_get("blog_count")?,
            )
        })
        .collect()
}

fn row_to_blog_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Blog> {
    Ok(Blog {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        blog_type: BlogType {
            id: row.try_get("blog_type_id")?,
            type_name: row.try_get("type_name")?,
        },
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        created_time: row.try_get("created_time")?,
        last_updated_time: row.try_get("last_updated_time")?,
        read_num: row.try_get("read_num")?,
    })
}

fn blog_date(year: i64, month: i64, blog_count: i64) -> Result<BlogDate> {
    Ok(BlogDate {
        year: i32::try_from(year).context("Archive year out of range")?,
        month: u32::try_from(month).context("Archive month out of range")?,
        blog_count,
    })
}
