//! LanceDB connection and table housekeeping helpers.
use std::sync::Arc;

use anyhow::Result;
use arrow_schema::Schema;
use lancedb::{connect, Connection, Table};
use tracing::info;

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}

/// Open `name`, creating it empty with `schema` when missing.
pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<Schema>) -> Result<Table> {
    if table_exists(conn, name).await? {
        return Ok(conn.open_table(name).execute().await?);
    }
    info!("Creating LanceDB table '{}'", name);
    Ok(conn.create_empty_table(name, schema).execute().await?)
}

/// Quote a string literal for a Lance SQL predicate.
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
