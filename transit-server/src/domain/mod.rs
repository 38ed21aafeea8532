//! Domain types for the transit catalogue.
//!
//! The core model shared by the catalogue and the routing engine. Stops
//! and bus lines live in owning arenas and are referenced everywhere by
//! the stable `StopId`/`BusId` handles defined here, never by pointers
//! or name strings.

mod bus;
mod geo;
mod stop;

pub use bus::{BusId, BusLine, LineKind};
pub use geo::haversine_meters;
pub use stop::{Stop, StopId};
