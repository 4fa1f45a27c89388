use std::sync::Arc;

use anyhow::{ensure, Result};
use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, StringArray};
use trexa_core::types::{IndexRecord, MetaValue, CHUNK_INDEX_KEY, FILE_NAME_KEY};

use crate::schema::build_arrow_schema;

/// Pack records into one Arrow batch matching [`build_arrow_schema`].
pub fn records_to_batch(records: &[IndexRecord], dim: usize) -> Result<RecordBatch> {
    let mut ids = Vec::with_capacity(records.len());
    let mut file_paths = Vec::with_capacity(records.len());
    let mut file_names = Vec::with_capacity(records.len());
    let mut chunk_indices = Vec::with_capacity(records.len());
    let mut texts = Vec::with_capacity(records.len());
    let mut metadata = Vec::with_capacity(records.len());
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(records.len());

    for r in records {
        ensure!(r.vector.len() == dim, "record {} has dim {}, index expects {}", r.id, r.vector.len(), dim);
        ids.push(r.id.clone());
        file_paths.push(r.file_path().unwrap_or_default().to_string());
        file_names.push(r.metadata.get(FILE_NAME_KEY).map(MetaValue::to_string).unwrap_or_default());
        let chunk_index = r.metadata.get(CHUNK_INDEX_KEY).and_then(MetaValue::as_i64).unwrap_or_default();
        chunk_indices.push(i32::try_from(chunk_index)?);
        texts.push(r.text.clone());
        metadata.push(serde_json::to_string(&r.metadata)?);
        vectors.push(Some(r.vector.iter().map(|&x| Some(x)).collect()));
    }

    let batch = RecordBatch::try_new(
        build_arrow_schema(dim),
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(file_paths)),
            Arc::new(StringArray::from(file_names)),
            Arc::new(Int32Array::from(chunk_indices)),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(metadata)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
                vectors,
                i32::try_from(dim)?,
            )),
        ],
    )?;
    Ok(batch)
}
