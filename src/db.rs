use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};
use tracing::info;

use crate::config::AppConfig;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// An in-memory SQLite database lives only as long as its connection, so
/// that pool is pinned to a single connection that never expires.
pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .context("parse DATABASE_URL")?
        .busy_timeout(BUSY_TIMEOUT);

    let mut options = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.database_url.contains(":memory:") {
        options = options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = options
        .connect_with(connect_options)
        .await
        .context("connect to database")?;
    info!(url = %config.database_url, "database connected");
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")?;
    Ok(())
}

/// Opens a transaction that already holds the database write lock.
///
/// A deferred transaction that reads first and writes later cannot wait for
/// the lock: SQLite fails the upgrade with `SQLITE_BUSY` straight away. The
/// no-op write below takes the lock while nothing has been read yet, so
/// concurrent writers queue on the busy timeout instead.
pub async fn begin_write(pool: &SqlitePool) -> sqlx::Result<Transaction<'static, Sqlite>> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE users SET id = id WHERE 0")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}
