//! trexa-core
//!
//! Shared domain types, the error taxonomy, word chunking, the `Embedder` and
//! `VectorIndex` seams, and the Figment-based configuration loader.

pub mod chunking;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
