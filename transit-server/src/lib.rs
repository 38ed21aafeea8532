//! Transit catalogue and itinerary routing server.
//!
//! Loads a JSON description of a bus network, answers statistics and
//! fastest-itinerary queries over it, and persists the built routing
//! state so later runs skip the precomputation.

pub mod catalogue;
pub mod dataset;
pub mod domain;
pub mod routing;
pub mod snapshot;
pub mod stats;
pub mod web;
