//! Blog category repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{BlogType, BlogTypeWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait BlogTypeRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, type_name: &str) -> Result<BlogType>;

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogType>>;

    /// All categories ordered by id, each with its number of blogs
    async fn list_with_count(&self) -> Result<Vec<BlogTypeWithCount>>;
}

pub struct SqlxBlogTypeRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogTypeRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogTypeRepository> {
        Arc::new(Self::new(pool))
    }
}

const LIST_WITH_COUNT: &str = r#"
    SELECT t.id, t.type_name, COUNT(b.id) AS blog_count
    FROM blog_types t
    LEFT JOIN blogs b ON b.blog_type_id = t.id
    GROUP BY t.id, t.type_name
    ORDER BY t.id
"#;

#[async_trait]
impl BlogTypeRepository for SqlxBlogTypeRepository {
    async fn create(&self, type_name: &str) -> Result<BlogType> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("INSERT INTO blog_types (type_name) VALUES (?)")
                .bind(type_name)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to create blog type")?
                .last_insert_rowid(),
            DatabaseDriver::Mysql => sqlx::query("INSERT INTO blog_types (type_name) VALUES (?)")
                .bind(type_name)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to create blog type")?
                .last_insert_id() as i64,
        };

        Ok(BlogType {
            id,
            type_name: type_name.to_string(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogType>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list_with_count(&self) -> Result<Vec<BlogTypeWithCount>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_with_count_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_with_count_mysql(self.pool.mysql()?).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<BlogType>> {
    let row = sqlx::query("SELECT id, type_name FROM blog_types WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog type by ID")?;

    Ok(row.map(|row| BlogType {
        id: row.get("id"),
        type_name: row.get("type_name"),
    }))
}

async fn list_with_count_sqlite(pool: &SqlitePool) -> Result<Vec<BlogTypeWithCount>> {
    let rows = sqlx::query(LIST_WITH_COUNT)
        .fetch_all(pool)
        .await
        .context("Failed to list blog types")?;

    Ok(rows
        .iter()
        .map(|row| BlogTypeWithCount {
            blog_type: BlogType {
                id: row.get("id"),
                type_name: row.get("type_name"),
            },
            blog_count: row.get("blog_count"),
        })
        .collect())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<BlogType>> {
    let row = sqlx::query("SELECT id, type_name FROM blog_types WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog type by ID")?;

    Ok(row.map(|row| BlogType {
        id: row.get("id"),
        type_name: row.get("type_name"),
    }))
}

async fn list_with_count_mysql(pool: &MySqlPool) -> Result<Vec<BlogTypeWithCount>> {
    let rows = sqlx::query(LIST_WITH_COUNT)
        .fetch_all(pool)
        .await
        .context("Failed to list blog types")?;

    Ok(rows
        .iter()
        .map(|row| BlogTypeWithCount {
            blog_type: BlogType {
                id: row.get("id"),
                type_name: row.get("type_name"),
            },
            blog_count: row.get("blog_count"),
        })
        .collect())
}
