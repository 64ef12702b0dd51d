//! Pooled SQLite connection

use crate::config::Config;
use di::inject;
use di::injectable;
use log::warn;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Pool shared by every DI-created connection once installed.
static INSTALLED_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);

pub struct DatabaseConnection {
    connection: SqlitePool,
}

#[injectable]
impl DatabaseConnection {
    /// Hands out the installed pool.
    ///
    /// The server binary and the tests always install one first. Without it, as when the crate
    /// is embedded as a library, a lazy pool is built from the environment; a missing or
    /// malformed `DATABASE_URL` then panics during service resolution, and the schema is
    /// expected to be migrated already.
    #[inject]
    pub fn create() -> DatabaseConnection {
        if let Some(pool) = Self::installed_pool() {
            return DatabaseConnection { connection: pool };
        }

        warn!("no pool installed, connecting lazily from the environment");
        let config = Config::load().expect("database configuration is missing");
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(&config.database_url)
            .expect("Cannot connect to database");

        DatabaseConnection { connection: pool }
    }
}

impl DatabaseConnection {
    /// Connects eagerly and brings the schema up to date.
    pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(pool)
    }

    /// Makes `pool` the one handed out by [`DatabaseConnection::create`].
    pub fn install_pool(pool: SqlitePool) {
        *INSTALLED_POOL.lock().unwrap_or_else(|e| e.into_inner()) = Some(pool);
    }

    pub fn clear_installed_pool() {
        INSTALLED_POOL.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    fn installed_pool() -> Option<SqlitePool> {
        INSTALLED_POOL
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Deref for DatabaseConnection {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl DerefMut for DatabaseConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connection
    }
}
