//! HTTP layer and shared plumbing for the trexa binaries.

pub mod handlers;
pub mod server;
pub mod state;
pub mod telemetry;

pub use server::build_router;
pub use state::AppState;
