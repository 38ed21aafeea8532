//! Loading the JSON network document.
//!
//! A network document carries `base_requests` (stop and bus declarations,
//! in any order) and `routing_settings`. Loading happens in three passes,
//! stops first, then road distances, then buses, so entries may reference
//! stops declared later in the document.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::catalogue::{Catalogue, CatalogueError};
use crate::domain::LineKind;
use crate::routing::{RoutingSettings, SettingsError};

/// Errors loading a network document.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The document file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The document is not valid JSON or misses required fields.
    #[error("malformed network document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A declaration contradicts the rest of the document.
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    /// `routing_settings` holds a non-positive value.
    #[error("invalid routing settings: {0}")]
    Settings(#[from] SettingsError),
}

/// A loaded network: the catalogue plus its routing settings.
#[derive(Debug)]
pub struct NetworkData {
    pub catalogue: Catalogue,
    pub settings: RoutingSettings,
}

#[derive(Debug, Deserialize)]
struct NetworkDocument {
    base_requests: Vec<BaseRequest>,
    routing_settings: RoutingSettings,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum BaseRequest {
    Stop {
        name: String,
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        road_distances: BTreeMap<String, f64>,
    },
    Bus {
        name: String,
        stops: Vec<String>,
        is_roundtrip: bool,
    },
}

/// Load a network document from a file.
pub fn load_path(path: &Path) -> Result<NetworkData, DatasetError> {
    let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_str(&json)
}

/// Load a network document from a JSON string.
pub fn load_str(json: &str) -> Result<NetworkData, DatasetError> {
    let document: NetworkDocument = serde_json::from_str(json)?;
    build(document)
}

fn build(document: NetworkDocument) -> Result<NetworkData, DatasetError> {
    document.routing_settings.validate()?;
    let mut catalogue = Catalogue::new();

    for request in &document.base_requests {
        if let BaseRequest::Stop {
            name,
            latitude,
            longitude,
            ..
        } = request
        {
            catalogue.add_stop(name, *latitude, *longitude)?;
        }
    }
    for request in &document.base_requests {
        if let BaseRequest::Stop {
            name,
            road_distances,
            ..
        } = request
        {
            for (to, meters) in road_distances {
                catalogue.set_distance(name, to, *meters)?;
            }
        }
    }
    for request in &document.base_requests {
        if let BaseRequest::Bus {
            name,
            stops,
            is_roundtrip,
        } = request
        {
            let kind = if *is_roundtrip {
                LineKind::Circular
            } else {
                LineKind::Linear
            };
            catalogue.add_bus(name, stops, kind)?;
        }
    }

    debug!(
        stops = catalogue.stops().len(),
        buses = catalogue.buses().len(),
        "network document loaded"
    );
    Ok(NetworkData {
        catalogue,
        settings: document.routing_settings,
    })
}
