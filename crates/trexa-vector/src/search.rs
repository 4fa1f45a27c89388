use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use trexa_core::types::{ChunkMatch, Metadata};

use crate::schema::{DISTANCE_COL, FILE_PATH_COL, ID_COL, METADATA_COL, TEXT_COL};

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("{name} column missing"))
}

/// Decode one result batch of a vector search.
pub fn batch_to_matches(batch: &RecordBatch) -> Result<Vec<ChunkMatch>> {
    let ids = string_column(batch, ID_COL)?;
    let texts = string_column(batch, TEXT_COL)?;
    let metadata = string_column(batch, METADATA_COL)?;
    let distances = batch
        .column_by_name(DISTANCE_COL)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

    let mut out = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let meta: Metadata = serde_json::from_str(metadata.value(i))?;
        let distance = distances.filter(|d| d.is_valid(i)).map_or(f32::MAX, |d| d.value(i));
        out.push(ChunkMatch {
            id: ids.value(i).to_string(),
            metadata: meta,
            text: texts.value(i).to_string(),
            distance,
        });
    }
    Ok(out)
}

/// `(id, metadata)` rows of a plain scan.
pub fn batch_to_metadata(batch: &RecordBatch) -> Result<Vec<(String, Metadata)>> {
    let ids = string_column(batch, ID_COL)?;
    let metadata = string_column(batch, METADATA_COL)?;
    (0..batch.num_rows())
        .map(|i| Ok((ids.value(i).to_string(), serde_json::from_str(metadata.value(i))?)))
        .collect()
}

pub fn batch_file_paths(batch: &RecordBatch) -> Result<Vec<String>> {
    let col = string_column(batch, FILE_PATH_COL)?;
    Ok((0..batch.num_rows()).map(|i| col.value(i).to_string()).collect())
}
