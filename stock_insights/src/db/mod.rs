//! Database utilities for connections and schema migrations.
//!
//! This module provides:
//! - SQLite connection helpers: [`connection::connect_sqlite`] applies WAL, foreign_keys=ON, and a 5000ms busy_timeout.
//! - Embedded Diesel migrations: [`migrate::run_sqlite`] and [`migrate::open`], which
//!   migrates and hands back a connection in one step.
//!
//! `DATABASE_URL` may be a bare path or use a `sqlite:` / `sqlite://` prefix.
//!
//! Example:
//! ```no_run
//! use stock_insights::db::migrate;
//!
//! let db_path = std::env::temp_dir().join("stock_insights_example.db");
//! let _conn = migrate::open(db_path.to_str().unwrap()).expect("migrated connection");
//! ```

pub mod connection;
pub mod migrate;
