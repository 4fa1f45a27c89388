//! [`VectorIndex`] over a single LanceDB table with cosine distance.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{Connection, DistanceType, Table};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use trexa_core::traits::VectorIndex;
use trexa_core::types::{ChunkMatch, IndexRecord, MetaValue, MetadataFilter};
use trexa_core::{Error, Result};

use crate::schema::{build_arrow_schema, is_promoted, FILE_PATH_COL, ID_COL, METADATA_COL};
use crate::search::{batch_file_paths, batch_to_matches, batch_to_metadata};
use crate::table::{ensure_table, open_db, sql_literal, table_exists};
use crate::writer::records_to_batch;

/// Ids per `id IN (...)` delete statement.
const DELETE_BATCH: usize = 256;

struct Handle {
    conn: Connection,
    table: Table,
}

pub struct LanceIndex {
    uri: String,
    table_name: String,
    dim: usize,
    handle: RwLock<Option<Handle>>,
}

impl LanceIndex {
    pub fn new(db_path: &Path, table_name: &str, dim: usize) -> Self {
        Self {
            uri: db_path.to_string_lossy().to_string(),
            table_name: table_name.to_string(),
            dim,
            handle: RwLock::new(None),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn table(&self) -> Result<Table> {
        self.handle.read().await.as_ref().map(|h| h.table.clone()).ok_or(Error::NotInitialized)
    }

    async fn scan_metadata(&self, table: &Table) -> Result<Vec<(String, trexa_core::types::Metadata)>> {
        let mut stream = table
            .query()
            .select(Select::columns(&[ID_COL, METADATA_COL]))
            .execute()
            .await
            .map_err(Error::backend)?;
        let mut rows = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(Error::backend)? {
            rows.extend(batch_to_metadata(&batch).map_err(Error::backend)?);
        }
        Ok(rows)
    }
}

fn predicate(filter: &MetadataFilter) -> String {
    match &filter.value {
        MetaValue::Null => format!("{} IS NULL", filter.key),
        MetaValue::Int(i) => format!("{} = {i}", filter.key),
        MetaValue::Float(x) => format!("{} = {x}", filter.key),
        MetaValue::Str(s) => format!("{} = {}", filter.key, sql_literal(s)),
    }
}

#[async_trait]
impl VectorIndex for LanceIndex {
    async fn initialize(&self) -> Result<()> {
        let mut guard = self.handle.write().await;
        if guard.is_some() {
            return Ok(());
        }
        info!("Initializing LanceDB at {}", self.uri);
        tokio::fs::create_dir_all(&self.uri).await?;
        let conn = open_db(&self.uri).await.map_err(Error::backend)?;
        let table = ensure_table(&conn, &self.table_name, build_arrow_schema(self.dim))
            .await
            .map_err(Error::backend)?;
        *guard = Some(Handle { conn, table });
        info!("Vector index '{}' ready", self.table_name);
        Ok(())
    }

    async fn open_existing(&self) -> Result<bool> {
        let mut guard = self.handle.write().await;
        if guard.is_some() {
            return Ok(true);
        }
        if !Path::new(&self.uri).is_dir() {
            info!("No vector index at {} yet", self.uri);
            return Ok(false);
        }
        let conn = open_db(&self.uri).await.map_err(Error::backend)?;
        if !table_exists(&conn, &self.table_name).await.map_err(Error::backend)? {
            info!("No table '{}' in {} yet", self.table_name, self.uri);
            return Ok(false);
        }
        let table = conn.open_table(&self.table_name).execute().await.map_err(Error::backend)?;
        *guard = Some(Handle { conn, table });
        info!("Opened existing vector index '{}'", self.table_name);
        Ok(true)
    }

    async fn is_ready(&self) -> bool {
        self.handle.read().await.is_some()
    }

    async fn upsert(&self, records: &[IndexRecord]) -> Result<()> {
        let table = self.table().await?;
        if records.is_empty() {
            return Ok(());
        }
        let batch = records_to_batch(records, self.dim).map_err(Error::backend)?;
        let schema = batch.schema();
        let reader = arrow_array::RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema);
        let mut mi = table.merge_insert(&[ID_COL]);
        mi.when_matched_update_all(None).when_not_matched_insert_all();
        mi.execute(Box::new(reader)).await.map_err(Error::backend)?;
        debug!("Upserted {} records into '{}'", records.len(), self.table_name);
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ChunkMatch>> {
        let table = self.table().await?;
        if top_k == 0 || table.count_rows(None).await.map_err(Error::backend)? == 0 {
            return Ok(Vec::new());
        }
        let mut stream = table
            .vector_search(vector.to_vec())
            .map_err(Error::backend)?
            .distance_type(DistanceType::Cosine)
            .limit(top_k)
            .execute()
            .await
            .map_err(Error::backend)?;
        let mut matches = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(Error::backend)? {
            matches.extend(batch_to_matches(&batch).map_err(Error::backend)?);
        }
        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn delete_where(&self, filter: &MetadataFilter) -> Result<()> {
        let table = self.table().await?;
        if is_promoted(&filter.key) {
            table.delete(&predicate(filter)).await.map_err(Error::backend)?;
            return Ok(());
        }
        let ids: Vec<String> = self
            .scan_metadata(&table)
            .await?
            .into_iter()
            .filter(|(_, meta)| filter.matches(meta))
            .map(|(id, _)| id)
            .collect();
        for group in ids.chunks(DELETE_BATCH) {
            let list: Vec<String> = group.iter().map(|id| sql_literal(id)).collect();
            table
                .delete(&format!("{ID_COL} IN ({})", list.join(", ")))
                .await
                .map_err(Error::backend)?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.handle.write().await;
        let Some(handle) = guard.as_mut() else {
            return Err(Error::NotInitialized);
        };
        warn!("Clearing vector index '{}'", self.table_name);
        let schema = build_arrow_schema(self.dim);
        let recreated = match handle.conn.drop_table(&self.table_name, &[]).await {
            Ok(()) => handle
                .conn
                .create_empty_table(&self.table_name, schema.clone())
                .execute()
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(e.into()),
        };
        match recreated {
            Ok(table) => {
                handle.table = table;
                info!("Cleared and recreated '{}'", self.table_name);
                Ok(())
            }
            Err(e) => {
                error!("Failed to clear '{}': {:#}", self.table_name, e);
                match ensure_table(&handle.conn, &self.table_name, schema).await {
                    Ok(table) => handle.table = table,
                    Err(recover) => {
                        error!("Could not recover '{}' after clear: {:#}", self.table_name, recover);
                        *guard = None;
                    }
                }
                Err(Error::backend(e))
            }
        }
    }

    async fn count(&self) -> Result<usize> {
        let table = self.table().await?;
        table.count_rows(None).await.map_err(Error::backend)
    }

    async fn file_paths(&self) -> Result<BTreeSet<String>> {
        let table = self.table().await?;
        let mut stream = table
            .query()
            .select(Select::columns(&[FILE_PATH_COL]))
            .execute()
            .await
            .map_err(Error::backend)?;
        let mut paths = BTreeSet::new();
        while let Some(batch) = stream.try_next().await.map_err(Error::backend)? {
            paths.extend(batch_file_paths(&batch).map_err(Error::backend)?);
        }
        Ok(paths)
    }
}
