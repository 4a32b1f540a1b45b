//! Embedded schema migrations
//!
//! Each migration carries SQL for both SQLite and MySQL. Applied versions
//! are recorded in `_migrations`, so running the migrations again only
//! applies what is new.

use anyhow::{Context, Result};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up_sqlite: &'static str,
    pub up_mysql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_blog_types",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS blog_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type_name VARCHAR(15) NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS blog_types (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                type_name VARCHAR(15) NOT NULL
            );
        "#,
    },
    Migration {
        version: 2,
        name: "create_blogs",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS blogs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(50) NOT NULL,
                blog_type_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                author VARCHAR(150) NOT NULL,
                created_time TIMESTAMP NOT NULL,
                last_updated_time TIMESTAMP NOT NULL,
                FOREIGN KEY (blog_type_id) REFERENCES blog_types(id) ON DELETE RESTRICT
            );
            CREATE INDEX IF NOT EXISTS idx_blogs_created_time ON blogs(created_time);
            CREATE INDEX IF NOT EXISTS idx_blogs_blog_type_id ON blogs(blog_type_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS blogs (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                title VARCHAR(50) NOT NULL,
                blog_type_id BIGINT NOT NULL,
                content LONGTEXT NOT NULL,
                author VARCHAR(150) NOT NULL,
                created_time DATETIME(6) NOT NULL,
                last_updated_time DATETIME(6) NOT NULL,
                FOREIGN KEY (blog_type_id) REFERENCES blog_types(id) ON DELETE RESTRICT
            );
            CREATE INDEX idx_blogs_created_time ON blogs(created_time);
        "#,
    },
    Migration {
        version: 3,
        name: "create_read_statistics",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS read_nums (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                blog_id INTEGER NOT NULL UNIQUE,
                read_num INTEGER NOT NULL DEFAULT 0 CHECK (read_num >= 0),
                FOREIGN KEY (blog_id) REFERENCES blogs(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS read_details (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                blog_id INTEGER NOT NULL,
                date DATE NOT NULL,
                read_num INTEGER NOT NULL DEFAULT 0 CHECK (read_num >= 0),
                UNIQUE (blog_id, date),
                FOREIGN KEY (blog_id) REFERENCES blogs(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_read_details_date ON read_details(date);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS read_nums (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                blog_id BIGINT NOT NULL UNIQUE,
                read_num BIGINT NOT NULL DEFAULT 0 CHECK (read_num >= 0),
                FOREIGN KEY (blog_id) REFERENCES blogs(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS read_details (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                blog_id BIGINT NOT NULL,
                date DATE NOT NULL,
                read_num BIGINT NOT NULL DEFAULT 0 CHECK (read_num >= 0),
                UNIQUE KEY uq_read_details_blog_date (blog_id, date),
                FOREIGN KEY (blog_id) REFERENCES blogs(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_read_details_date ON read_details(date);
        "#,
    },
];

/// Apply all pending migrations, returning how many were applied
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;
    let applied = applied_versions(pool).await?;

    let mut count = 0;
    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }
        tracing::info!("Applying migration {}: {}", migration.version, migration.name);
        apply_migration(pool, migration)
            .await
            .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
        count += 1;
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    const SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version BIGINT PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    "#;

    match pool.driver() {
        DatabaseDriver::Sqlite => {
            sqlx::query(SQL).execute(pool.sqlite()?).await?;
        }
        DatabaseDriver::Mysql => {
            sqlx::query(SQL).execute(pool.mysql()?).await?;
        }
    }
    Ok(())
}

async fn applied_versions(pool: &DynDatabasePool) -> Result<Vec<i64>> {
    const SQL: &str = "SELECT version FROM _migrations ORDER BY version";

    let versions = match pool.driver() {
        DatabaseDriver::Sqlite => sqlx::query_scalar(SQL).fetch_all(pool.sqlite()?).await?,
        DatabaseDriver::Mysql => sqlx::query_scalar(SQL).fetch_all(pool.mysql()?).await?,
    };
    Ok(versions)
}

async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    const RECORD: &str = "INSERT INTO _migrations (version, name) VALUES (?, ?)";

    match pool.driver() {
        DatabaseDriver::Sqlite => {
            let sqlite = pool.sqlite()?;
            for statement in split_sql_statements(migration.up_sqlite) {
                sqlx::query(statement)
                    .execute(sqlite)
                    .await
                    .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
            }
            sqlx::query(RECORD)
                .bind(migration.version)
                .bind(migration.name)
                .execute(sqlite)
                .await?;
        }
        DatabaseDriver::Mysql => {
            let mysql = pool.mysql()?;
            for statement in split_sql_statements(migration.up_mysql) {
                sqlx::query(statement)
                    .execute(mysql)
                    .await
                    .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
            }
            sqlx::query(RECORD)
                .bind(migration.version)
                .bind(migration.name)
                .execute(mysql)
                .await?;
        }
    }
    Ok(())
}

fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split a migration body on `;`, dropping empty and comment-only pieces
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| {
            stmt.lines()
                .map(str::trim)
                .any(|line| !line.is_empty() && !line.starts_with("--"))
        })
        .collect()
}
