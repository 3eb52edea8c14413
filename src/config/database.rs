//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the database schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    ActivityLog, Client, Event, Expense, ExpenseCategory, Payment, Staff, StaffLog, SubEvent,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::{Path, PathBuf};

/// Default database location used when neither the config file nor the environment names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/chakachak.sqlite?mode=rwc";

/// File path of a `sqlite://` URL, or `None` for in-memory and non-SQLite URLs.
fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url)
        .as_deref()
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!(database_url, "connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet.
///
/// Parents are created before children so foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Client).await?;
    create_table(db, &schema, Event).await?;
    create_table(db, &schema, SubEvent).await?;
    create_table(db, &schema, Payment).await?;
    create_table(db, &schema, ExpenseCategory).await?;
    create_table(db, &schema, Expense).await?;
    create_table(db, &schema, Staff).await?;
    create_table(db, &schema, StaffLog).await?;
    create_table(db, &schema, ActivityLog).await?;

    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(db.get_database_backend().build(&statement)).await?;
    Ok(())
}
