//! Read statistics repository
//!
//! Two tables back the counters: `read_nums` holds one running total per
//! blog and `read_details` one row per blog per day. Both are bumped in the
//! same transaction.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{DailyHotBlog, HotBlog, ReadDetail};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait ReadStatsRepository: Send + Sync {
    /// Add `count` reads to a blog's total and to its row for `date`,
    /// creating either row when missing
    async fn add_reads(&self, blog_id: i64, date: NaiveDate, count: i64) -> Result<()>;

    /// Total reads of a blog, 0 when never read
    async fn total_reads(&self, blog_id: i64) -> Result<i64>;

    async fn get_detail(&self, blog_id: i64, date: NaiveDate) -> Result<Option<ReadDetail>>;

    /// Blogs ranked by reads summed over `[today - days, today)`.
    ///
    /// Ties keep ascending blog id order.
    async fn hot_blogs_in_window(
        &self,
        today: NaiveDate,
        days: i64,
        limit: i64,
    ) -> Result<Vec<HotBlog>>;

    /// Reads of all blogs summed per day over `[start, end)`; days without
    /// reads are absent
    async fn read_sums_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>>;

    /// The most-read blogs of a single day
    async fn hot_blogs_on(&self, date: NaiveDate, limit: i64) -> Result<Vec<DailyHotBlog>>;
}

pub struct SqlxReadStatsRepository {
    pool: DynDatabasePool,
}

impl SqlxReadStatsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ReadStatsRepository> {
        Arc::new(Self::new(pool))
    }
}

const TOTAL_READS: &str = "SELECT read_num FROM read_nums WHERE blog_id = ?";

const GET_DETAIL: &str =
    "SELECT blog_id, date, read_num FROM read_details WHERE blog_id = ? AND date = ?";

const HOT_BLOGS_ON: &str = r#"
    SELECT d.blog_id, b.title, d.date, d.read_num
    FROM read_details d
    INNER JOIN blogs b ON b.id = d.blog_id
    WHERE d.date = ?
    ORDER BY d.read_num DESC, d.blog_id ASC
    LIMIT ?
"#;

#[async_trait]
impl ReadStatsRepository for SqlxReadStatsRepository {
    async fn add_reads(&self, blog_id: i64, date: NaiveDate, count: i64) -> Result<()> {
        if count < 0 {
            anyhow::bail!("Read count must not be negative, got {}", count);
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => add_reads_sqlite(self.pool.sqlite()?, blog_id, date, count).await,
            DatabaseDriver::Mysql => add_reads_mysql(self.pool.mysql()?, blog_id, date, count).await,
        }
    }

    async fn total_reads(&self, blog_id: i64) -> Result<i64> {
        let total: Option<i64> = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query_scalar(TOTAL_READS)
                .bind(blog_id)
                .fetch_optional(self.pool.sqlite()?)
                .await
                .context("Failed to get total reads")?,
            DatabaseDriver::Mysql => sqlx::query_scalar(TOTAL_READS)
                .bind(blog_id)
                .fetch_optional(self.pool.mysql()?)
                .await
                .context("Failed to get total reads")?,
        };
        Ok(total.unwrap_or(0))
    }

    async fn get_detail(&self, blog_id: i64, date: NaiveDate) -> Result<Option<ReadDetail>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(GET_DETAIL)
                    .bind(blog_id)
                    .bind(date)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get read detail")?;
                Ok(row.map(|row| ReadDetail {
                    blog_id: row.get("blog_id"),
                    date: row.get("date"),
                    read_num: row.get("read_num"),
                }))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(GET_DETAIL)
                    .bind(blog_id)
                    .bind(date)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get read detail")?;
                Ok(row.map(|row| ReadDetail {
                    blog_id: row.get("blog_id"),
                    date: row.get("date"),
                    read_num: row.get("read_num"),
                }))
            }
        }
    }

    async fn hot_blogs_in_window(
        &self,
        today: NaiveDate,
        days: i64,
        limit: i64,
    ) -> Result<Vec<HotBlog>> {
        let start = today - Duration::days(days);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                hot_blogs_in_window_sqlite(self.pool.sqlite()?, start, today, limit).await
            }
            DatabaseDriver::Mysql => {
                hot_blogs_in_window_mysql(self.pool.mysql()?, start, today, limit).await
            }
        }
    }

    async fn read_sums_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => read_sums_between_sqlite(self.pool.sqlite()?, start, end).await,
            DatabaseDriver::Mysql => read_sums_between_mysql(self.pool.mysql()?, start, end).await,
        }
    }

    async fn hot_blogs_on(&self, date: NaiveDate, limit: i64) -> Result<Vec<DailyHotBlog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(HOT_BLOGS_ON)
                    .bind(date)
                    .bind(limit)
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to list daily hot blogs")?;
                Ok(rows
                    .iter()
                    .map(|row| DailyHotBlog {
                        blog_id: row.get("blog_id"),
                        title: row.get("title"),
                        date: row.get("date"),
                        read_num: row.get("read_num"),
                    })
                    .collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(HOT_BLOGS_ON)
                    .bind(date)
                    .bind(limit)
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to list daily hot blogs")?;
                Ok(rows
                    .iter()
                    .map(|row| DailyHotBlog {
                        blog_id: row.get("blog_id"),
                        title: row.get("title"),
                        date: row.get("date"),
                        read_num: row.get("read_num"),
                    })
                    .collect())
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn add_reads_sqlite(pool: &SqlitePool, blog_id: i64, date: NaiveDate, count: i64) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(
        r#"
        INSERT INTO read_nums (blog_id, read_num) VALUES (?, ?)
        ON CONFLICT(blog_id) DO UPDATE SET read_num = read_num + excluded.read_num
        "#,
    )
    .bind(blog_id)
    .bind(count)
    .execute(&mut *tx)
    .await
    .context("Failed to update total reads")?;

    sqlx::query(
        r#"
        INSERT INTO read_details (blog_id, date, read_num) VALUES (?, ?, ?)
        ON CONFLICT(blog_id, date) DO UPDATE SET read_num = read_num + excluded.read_num
        "#,
    )
    .bind(blog_id)
    .bind(date)
    .bind(count)
    .execute(&mut *tx)
    .await
    .context("Failed to update daily reads")?;

    tx.commit().await.context("Failed to commit read counts")?;
    Ok(())
}

async fn hot_blogs_in_window_sqlite(
    pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
    limit: i64,
) -> Result<Vec<HotBlog>> {
    let rows = sqlx::query(
        r#"
        SELECT b.id, b.title, SUM(d.read_num) AS read_num_sum
        FROM read_details d
        INNER JOIN blogs b ON b.id = d.blog_id
        WHERE d.date >= ? AND d.date < ?
        GROUP BY b.id, b.title
        ORDER BY read_num_sum DESC, b.id ASC
        LIMIT ?
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to aggregate hot blogs")?;

    Ok(rows
        .iter()
        .map(|row| HotBlog {
            id: row.get("id"),
            title: row.get("title"),
            read_num_sum: row.get("read_num_sum"),
        })
        .collect())
}

async fn read_sums_between_sqlite(
    pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, i64)>> {
    let rows = sqlx::query(
        r#"
        SELECT date, SUM(read_num) AS read_num_sum
        FROM read_details
        WHERE date >= ? AND date < ?
        GROUP BY date
        ORDER BY date
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("Failed to sum daily reads")?;

    Ok(rows
        .iter()
        .map(|row| (row.get("date"), row.get("read_num_sum")))
        .collect())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn add_reads_mysql(pool: &MySqlPool, blog_id: i64, date: NaiveDate, count: i64) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(
        r#"
        INSERT INTO read_nums (blog_id, read_num) VALUES (?, ?)
        ON DUPLICATE KEY UPDATE read_num = read_num + VALUES(read_num)
        "#,
    )
    .bind(blog_id)
    .bind(count)
    .execute(&mut *tx)
    .await
    .context("Failed to update total reads")?;

    sqlx::query(
        r#"
        INSERT INTO read_details (blog_id, date, read_num) VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE read_num = read_num + VALUES(read_num)
        "#,
    )
    .bind(blog_id)
    .bind(date)
    .bind(count)
    .execute(&mut *tx)
    .await
    .context("Failed to update daily reads")?;

    tx.commit().await.context("Failed to commit read counts")?;
    Ok(())
}

async fn hot_blogs_in_window_mysql(
    pool: &MySqlPool,
    start: NaiveDate,
    end: NaiveDate,
    limit: i64,
) -> Result<Vec<HotBlog>> {
    // SUM over BIGINT is DECIMAL in MySQL
    let rows = sqlx::query(
        r#"
        SELECT b.id, b.title, CAST(SUM(d.read_num) AS SIGNED) AS read_num_sum
        FROM read_details d
        INNER JOIN blogs b ON b.id = d.blog_id
        WHERE d.date >= ? AND d.date < ?
        GROUP BY b.id, b.title
        ORDER BY read_num_sum DESC, b.id ASC
        LIMIT ?
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to aggregate hot blogs")?;

    Ok(rows
        .iter()
        .map(|row| HotBlog {
            id: row.get("id"),
            title: row.get("title"),
            read_num_sum: row.get("read_num_sum"),
        })
        .collect())
}

async fn read_sums_between_mysql(
    pool: &MySqlPool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, i64)>> {
    let rows = sqlx::query(
        r#"
        SELECT date, CAST(SUM(read_num) AS SIGNED) AS read_num_sum
        FROM read_details
        WHERE date >= ? AND date < ?
        GROUP BY date
        ORDER BY date
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("Failed to sum daily reads")?;

    Ok(rows
        .iter()
        .map(|row| (row.get("date"), row.get("read_num_sum")))
        .collect())
}
