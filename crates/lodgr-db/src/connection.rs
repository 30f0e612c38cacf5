//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema;

/// Connection settings for the lodgr database.
///
/// The server builds this from `LODGR_DB_*` environment variables via
/// [`DbConfig::from_env`]; tests construct it directly.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "lodgr".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

impl DbConfig {
    /// Read the configuration from `LODGR_DB_URL`, `LODGR_DB_NS`,
    /// `LODGR_DB_NAME`, `LODGR_DB_USER` and `LODGR_DB_PASS`, falling
    /// back to the defaults for any that are unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_or("LODGR_DB_URL", defaults.url),
            namespace: env_or("LODGR_DB_NS", defaults.namespace),
            database: env_or("LODGR_DB_NAME", defaults.database),
            username: env_or("LODGR_DB_USER", defaults.username),
            password: env_or("LODGR_DB_PASS", defaults.password),
        }
    }
}

/// Owns the connection the repositories and the occupancy store clone
/// their handles from.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect, authenticate as root and select the configured
    /// namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Connected to SurrealDB");

        Ok(Self { db })
    }

    /// Apply any pending schema migrations on this connection.
    pub async fn migrate(&self) -> Result<(), DbError> {
        schema::run_migrations(&self.db).await
    }

    /// The underlying client. Repositories take clones of this handle.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
