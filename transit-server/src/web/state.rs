//! Application state for the web layer.

use std::sync::Arc;

use crate::catalogue::Catalogue;
use crate::routing::Planner;

/// Shared application state.
///
/// Both halves are frozen once the server starts, so handlers read them
/// concurrently without locking.
#[derive(Clone)]
pub struct AppState {
    /// The loaded network.
    pub catalogue: Arc<Catalogue>,

    /// Routing tables built over the network.
    pub planner: Arc<Planner>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(catalogue: Catalogue, planner: Planner) -> Self {
        Self {
            catalogue: Arc::new(catalogue),
            planner: Arc::new(planner),
        }
    }
}
