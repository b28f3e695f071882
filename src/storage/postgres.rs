//! PostgreSQL adapter.
//!
//! Each post is one row in `blogs(id serial primary key, title text,
//! content text)`. The integer primary key renders as its decimal string
//! form everywhere outside this adapter.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::error::{StorageError, StorageResult};
use super::record::Blog;
use super::store::BlogStore;

/// Timeout for establishing the initial connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Maximum connections in the pool.
const MAX_CONNECTIONS: u32 = 5;

/// Bootstrap DDL so a fresh database serves requests without a separate
/// provisioning step.
const BLOGS_TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS blogs (
    id      SERIAL PRIMARY KEY,
    title   TEXT NOT NULL,
    content TEXT NOT NULL
)
"#;

/// A blog row. Columns bind by name, not position, so the declared column
/// order in queries is free to differ from the table definition.
#[derive(Debug, sqlx::FromRow)]
struct BlogRow {
    id: i32,
    title: String,
    content: String,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        Self {
            id: row.id.to_string(),
            title: row.title,
            content: row.content,
        }
    }
}

/// Relational implementation of [`BlogStore`].
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to PostgreSQL and ensure the blogs table exists.
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect(url)
            .await
            .map_err(|e| StorageError::connection(format!("failed to connect: {e}")))?;

        sqlx::query(BLOGS_TABLE_DDL)
            .execute(&pool)
            .await
            .map_err(|e| {
                StorageError::connection(format!("failed to prepare blogs table: {e}"))
            })?;

        tracing::info!("Connected to Postgres");

        Ok(Self { pool })
    }

    /// Close the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Parse an external string id into the integer primary key.
    ///
    /// The caller maps a failure to the status its operation surfaces; the
    /// backend signals a missing row and a key that cannot exist the same
    /// way, so a reader treats both as not-found while a mutation treats
    /// both as invalid.
    fn parse_id(id: &str) -> Option<i32> {
        id.parse().ok()
    }
}

#[async_trait]
impl BlogStore for PostgresStore {
    async fn create(&self, title: &str, content: &str) -> StorageResult<Blog> {
        // The backend returns the generated key synchronously with the
        // insert; no read-back round trip.
        let id: i32 =
            sqlx::query_scalar("INSERT INTO blogs (title, content) VALUES ($1, $2) RETURNING id")
                .bind(title)
                .bind(content)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    StorageError::invalid_argument(format!(
                        "there was an error creating a blog: {e}"
                    ))
                })?;

        Ok(Blog {
            id: id.to_string(),
            title: title.to_owned(),
            content: content.to_owned(),
        })
    }

    async fn get(&self, id: &str) -> StorageResult<Blog> {
        let Some(key) = Self::parse_id(id) else {
            return Err(StorageError::not_found(format!(
                "no blog was found for id: {id}"
            )));
        };

        let row: Option<BlogRow> =
            sqlx::query_as("SELECT id, title, content FROM blogs WHERE id = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    StorageError::not_found(format!("there was an error finding blog {id}: {e}"))
                })?;

        row.map(Blog::from)
            .ok_or_else(|| StorageError::not_found(format!("no blog was found for id: {id}")))
    }

    async fn update(&self, id: &str, title: &str, content: &str) -> StorageResult<Blog> {
        let Some(key) = Self::parse_id(id) else {
            return Err(StorageError::invalid_argument("invalid blog id"));
        };

        let result = sqlx::query("UPDATE blogs SET title = $2, content = $3 WHERE id = $1")
            .bind(key)
            .bind(title)
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StorageError::invalid_argument(format!("blog {id} could not be updated: {e}"))
            })?;

        // Execution reports success even when no row matched; the affected
        // count is the only absence signal.
        if result.rows_affected() == 0 {
            return Err(StorageError::invalid_argument(format!(
                "blog {id} could not be updated: no matching rows"
            )));
        }

        Ok(Blog {
            id: id.to_owned(),
            title: title.to_owned(),
            content: content.to_owned(),
        })
    }

    async fn delete(&self, id: &str) -> StorageResult<String> {
        let Some(key) = Self::parse_id(id) else {
            return Err(StorageError::invalid_argument("invalid blog id"));
        };

        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StorageError::invalid_argument(format!("unable to delete blog {id}: {e}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::invalid_argument(format!(
                "unable to delete blog with id: {id}"
            )));
        }

        Ok(id.to_owned())
    }

    async fn list(&self, limit: i64) -> StorageResult<Vec<Blog>> {
        let rows: Vec<BlogRow> = sqlx::query_as("SELECT id, title, content FROM blogs LIMIT $1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                StorageError::not_found(format!("there was an error listing blogs: {e}"))
            })?;

        // An empty table is an empty, successful result here; only the
        // document adapter signals it as not-found.
        Ok(rows.into_iter().map(Blog::from).collect())
    }
}
