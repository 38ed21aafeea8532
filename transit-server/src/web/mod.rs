//! Web layer for the transit network.
//!
//! Provides HTTP endpoints over the frozen catalogue and routing tables.

mod routes;
mod state;

pub use routes::{AppError, create_router};
pub use state::AppState;
