//! Embedded schema migrations.

use anyhow::anyhow;
use diesel::{Connection, SqliteConnection, connection::SimpleConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::db::connection::{connect_sqlite, sqlite_path};

/// Embedded Diesel migrations bundled with this crate.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs pending migrations on the SQLite database at `database_url`.
///
/// Sets WAL journaling first; returns how many migrations were applied.
pub fn run_sqlite(database_url: &str) -> anyhow::Result<usize> {
    let mut conn = SqliteConnection::establish(sqlite_path(database_url))?;
    conn.batch_execute("PRAGMA journal_mode=WAL;")?;
    run_pending(&mut conn)
}

/// Applies pending migrations on an already open connection.
pub fn run_pending(conn: &mut SqliteConnection) -> anyhow::Result<usize> {
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| anyhow!(e))?;
    Ok(applied.len())
}

/// Migrates the database and returns a tuned connection to it.
///
/// This is the one call a process makes at start-up; the connection is then
/// passed explicitly to everything that touches the store.
pub fn open(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let mut conn = connect_sqlite(database_url)?;
    run_pending(&mut conn)?;
    Ok(conn)
}
