#[cfg(feature = "database")]
use anyhow::Result;
#[cfg(feature = "database")]
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, SqlitePool};
#[cfg(feature = "database")]
use tracing::info;

#[cfg(feature = "database")]
use crate::config::DatabaseConfig;
#[cfg(feature = "database")]
use crate::privacy::SqliteRequestStore;

#[cfg(feature = "database")]
/// Database manager owning the SQLite pool
pub struct DatabaseManager {
    pool: SqlitePool,
}

#[cfg(feature = "database")]
impl DatabaseManager {
    /// Initialize database with automatic migrations
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.url.as_str();

        if let Some(parent) = sqlite_file_path(database_url).and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Create database if it doesn't exist
        if !sqlx::Sqlite::database_exists(database_url).await? {
            info!("Creating database at {}", database_url);
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(database_url)
            .await?;

        if config.auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }

    /// Get database pool for queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Request store sharing this manager's pool
    pub fn request_store(&self) -> SqliteRequestStore {
        SqliteRequestStore::new(self.pool.clone())
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

#[cfg(feature = "database")]
fn sqlite_file_path(url: &str) -> Option<&std::path::Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(std::path::Path::new(path))
    }
}

#[cfg(all(test, feature = "database"))]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite://data/privacy.db?mode=rwc"),
            Some(std::path::Path::new("data/privacy.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
    }

    #[tokio::test]
    async fn test_manager_migrates_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("data").join("privacy.db").display()),
            max_connections: 2,
            auto_migrate: true,
        };

        let manager = DatabaseManager::new(&config).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM privacy_requests")
            .fetch_one(manager.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);

        manager.shutdown().await;
        assert!(dir.path().join("data").join("privacy.db").exists());
    }
}
