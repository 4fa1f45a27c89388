pub mod graph;
pub mod indexing;
pub mod json_error;
pub mod search;
