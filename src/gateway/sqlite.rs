use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::wire::{
    into_created_registrant, into_registrant, to_create_request, RemoteAddress, RemoteUser,
};
use super::{GatewayError, GatewayResult, RosterGateway, EMAIL_TAKEN};
use crate::error::{AppError, AppResult};
use crate::models::{Registrant, RegistrantId, RegistrantInput};
use crate::utils::normalize_email;

/// Roster store backed by SQLite through a sqlx pool
///
/// Rows are kept in the remote wire shape. A unique column holding the
/// normalized email rejects duplicates the way the remote API does.
pub struct SqliteGateway {
    pool: SqlitePool,
}

fn is_memory_url(url: &str) -> bool {
    let url = url.trim_start_matches("sqlite:");
    url == ":memory:" || url.contains("mode=memory")
}

impl SqliteGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `url` and create the users table if needed
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Configuration(format!("Invalid SQLite URL {}: {}", url, e)))?
            .create_if_missing(true);

        // Every connection to :memory: is a different database
        let pool_options = if is_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to SQLite: {}", e)))?;

        let gateway = Self::new(pool);
        gateway.init_schema().await?;
        info!(url = %url, "roster store ready");
        Ok(gateway)
    }

    async fn init_schema(&self) -> AppResult<()> {
        // email_norm holds the Unicode-lowercased email; SQLite's LOWER only folds ASCII
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS roster_users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                email_norm TEXT NOT NULL UNIQUE,
                city TEXT NOT NULL DEFAULT '',
                zipcode TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create roster_users table: {}", e)))?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Map database errors onto the gateway taxonomy
pub fn map_database_error(error: sqlx::Error) -> GatewayError {
    match &error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            GatewayError::Business(EMAIL_TAKEN.to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            GatewayError::transport(error.to_string())
        }
        _ => GatewayError::server(error.to_string()),
    }
}

fn parse_created_at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl RosterGateway for SqliteGateway {
    async fn list_all(&self) -> GatewayResult<Vec<Registrant>> {
        let rows = sqlx::query(
            "SELECT id, name, email, city, zipcode, created_at FROM roster_users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_database_error)?;

        rows.iter()
            .map(|row| -> GatewayResult<Registrant> {
                let id: i64 = row.try_get("id").map_err(map_database_error)?;
                let created_at: String = row.try_get("created_at").map_err(map_database_error)?;
                let remote = RemoteUser {
                    id: id as RegistrantId,
                    name: row.try_get("name").map_err(map_database_error)?,
                    email: row.try_get("email").map_err(map_database_error)?,
                    address: Some(RemoteAddress {
                        city: row.try_get("city").map_err(map_database_error)?,
                        zipcode: row.try_get("zipcode").map_err(map_database_error)?,
                    }),
                };
                Ok(into_registrant(remote, parse_created_at(&created_at)))
            })
            .collect()
    }

    async fn create(&self, candidate: &RegistrantInput) -> GatewayResult<Registrant> {
        let request = to_create_request(candidate);
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO roster_users (name, email, email_norm, city, zipcode, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(normalize_email(&request.email))
        .bind(&request.address.city)
        .bind(&request.address.zipcode)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_database_error)?;

        let response = RemoteUser {
            id: result.last_insert_rowid() as RegistrantId,
            name: request.name,
            email: request.email,
            address: Some(request.address),
        };
        Ok(into_created_registrant(response, candidate, now))
    }

    async fn remove(&self, id: RegistrantId) -> GatewayResult<()> {
        sqlx::query("DELETE FROM roster_users WHERE id = ?1")
            .bind(id as i64)
            .execute(&self.pool)
            .await
            .map_err(map_database_error)?;
        Ok(())
    }
}
