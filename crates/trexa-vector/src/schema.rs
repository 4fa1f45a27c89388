use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const ID_COL: &str = "id";
pub const FILE_PATH_COL: &str = "file_path";
pub const FILE_NAME_COL: &str = "file_name";
pub const CHUNK_INDEX_COL: &str = "chunk_index";
pub const TEXT_COL: &str = "text";
/// Full metadata map serialized as a JSON object.
pub const METADATA_COL: &str = "metadata";
pub const VECTOR_COL: &str = "vector";
pub const DISTANCE_COL: &str = "_distance";

/// Columns stored for every chunk. `file_path`, `file_name` and
/// `chunk_index` are duplicated out of `metadata` so they can be filtered on.
pub fn build_arrow_schema(dim: usize) -> Arc<Schema> {
    let dim = i32::try_from(dim).unwrap_or(i32::MAX);
    Arc::new(Schema::new(vec![
        Field::new(ID_COL, DataType::Utf8, false),
        Field::new(FILE_PATH_COL, DataType::Utf8, false),
        Field::new(FILE_NAME_COL, DataType::Utf8, false),
        Field::new(CHUNK_INDEX_COL, DataType::Int32, false),
        Field::new(TEXT_COL, DataType::Utf8, false),
        Field::new(METADATA_COL, DataType::Utf8, false),
        Field::new(
            VECTOR_COL,
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}

/// Whether `key` has its own column and can be filtered in SQL.
pub fn is_promoted(key: &str) -> bool {
    matches!(key, FILE_PATH_COL | FILE_NAME_COL | CHUNK_INDEX_COL)
}
