//! trexa-vector
//!
//! Storage backends for index records: [`LanceIndex`] persists to a LanceDB
//! directory, [`MemoryIndex`] keeps everything in process. Both rank by
//! cosine distance and implement [`trexa_core::traits::VectorIndex`].

pub mod memory;
pub mod schema;
pub mod search;
pub mod store;
pub mod table;
pub mod writer;

pub use memory::MemoryIndex;
pub use store::LanceIndex;
