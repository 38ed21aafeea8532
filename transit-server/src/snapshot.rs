//! Binary snapshots of the built network.
//!
//! Build once, query many: a snapshot carries the catalogue, the routing
//! settings, the route graph, the router's path table, and the stop →
//! vertex map, so loading it answers every query exactly as the freshly
//! built state would, without re-running the all-pairs precomputation.
//!
//! File layout, little-endian: a fixed 20-byte header {magic `"TCAT"`,
//! format version u32, payload length u64, xxh32 checksum u32} followed
//! by the `bitcode`-encoded payload. The writer goes through a temp file
//! and rename, so a crash mid-write never leaves a torn snapshot behind.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bitcode::{Decode, Encode};
use tracing::{debug, info};
use xxhash_rust::xxh32::xxh32;

use crate::catalogue::{Catalogue, CatalogueError};
use crate::domain::LineKind;
use crate::routing::{
    DirectedWeightedGraph, Edge, EdgeId, PathEntry, Planner, RouteStep, Router, RoutingSettings,
    StopVertices, VertexId,
};

/// Magic bytes identifying a transit snapshot file.
pub const MAGIC: [u8; 4] = *b"TCAT";

/// Current snapshot format version. Bump on any payload layout change;
/// there is no migration path, old files are rebuilt from their network
/// documents.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_SIZE: usize = 20;
const XXHASH_SEED: u32 = 0;

/// Errors reading or writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        source: std::io::Error,
    },

    /// The file is shorter than the fixed header.
    #[error("snapshot header truncated: {len} bytes")]
    TruncatedHeader { len: usize },

    /// The file does not start with the snapshot magic.
    #[error("not a snapshot file: bad magic {found:02x?}")]
    BadMagic { found: [u8; 4] },

    /// The file was written by a different format version.
    #[error("unsupported snapshot version {found}, this build reads version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The payload is shorter or longer than the header declares.
    #[error("payload length mismatch: header declares {declared} bytes, found {actual}")]
    PayloadLength { declared: u64, actual: usize },

    /// The payload bytes do not hash to the recorded checksum.
    #[error("snapshot corrupted: checksum mismatch (expected {expected:#010x}, computed {computed:#010x})")]
    ChecksumMismatch { expected: u32, computed: u32 },

    /// The payload bytes are not a valid encoding.
    #[error("failed to decode snapshot payload: {0}")]
    Decode(#[from] bitcode::Error),

    /// Restoring the catalogue hit a contradiction (duplicate names).
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    /// A decoded record references an index outside the snapshot.
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(&'static str),
}

#[derive(Encode, Decode)]
struct SnapshotPayload {
    bus_wait_time: f64,
    bus_velocity: f64,
    stops: Vec<StopRecord>,
    distances: Vec<DistanceRecord>,
    buses: Vec<BusRecord>,
    vertex_count: usize,
    edges: Vec<EdgeRecord>,
    incidence: Vec<Vec<usize>>,
    table: Vec<Vec<Option<PathEntryRecord>>>,
    stop_vertices: Vec<StopVertexRecord>,
}

#[derive(Encode, Decode)]
struct StopRecord {
    name: String,
    latitude: f64,
    longitude: f64,
}

/// Stop references are indices into the payload's own stop list, which
/// restores in declaration order and so reproduces the original ids.
#[derive(Encode, Decode)]
struct DistanceRecord {
    from: u32,
    to: u32,
    meters: f64,
}

#[derive(Encode, Decode)]
struct BusRecord {
    name: String,
    circular: bool,
    stops: Vec<u32>,
}

#[derive(Encode, Decode)]
struct EdgeRecord {
    from: usize,
    to: usize,
    step: StepRecord,
}

#[derive(Encode, Decode)]
enum StepRecord {
    Wait { stop: String, minutes: f64 },
    Ride { bus: String, span: u32, minutes: f64 },
}

#[derive(Encode, Decode)]
struct PathEntryRecord {
    total: f64,
    prev_edge: Option<usize>,
}

#[derive(Encode, Decode)]
struct StopVertexRecord {
    name: String,
    arrival: usize,
    departure: usize,
}

impl From<&RouteStep> for StepRecord {
    fn from(step: &RouteStep) -> Self {
        match step {
            RouteStep::Wait { stop, minutes } => StepRecord::Wait {
                stop: stop.to_string(),
                minutes: *minutes,
            },
            RouteStep::Ride { bus, span, minutes } => StepRecord::Ride {
                bus: bus.to_string(),
                span: *span,
                minutes: *minutes,
            },
        }
    }
}

/// Write a snapshot of the built state to `path`, atomically.
pub fn save(path: &Path, catalogue: &Catalogue, planner: &Planner) -> Result<(), SnapshotError> {
    let bytes = encode_bytes(catalogue, planner);
    write_atomically(path, &bytes).map_err(|source| SnapshotError::Io {
        action: "write",
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
}

/// Read a snapshot back into a catalogue and a ready planner.
pub fn load(path: &Path) -> Result<(Catalogue, Planner), SnapshotError> {
    let bytes = std::fs::read(path).map_err(|source| SnapshotError::Io {
        action: "read",
        path: path.display().to_string(),
        source,
    })?;
    let state = decode_bytes(&bytes)?;
    info!(path = %path.display(), "snapshot loaded");
    Ok(state)
}

/// Encode the built state as snapshot bytes, header included.
///
/// The encoding is deterministic: the same state always produces the
/// same bytes.
pub fn encode_bytes(catalogue: &Catalogue, planner: &Planner) -> Vec<u8> {
    let payload = bitcode::encode(&payload_from(catalogue, planner));
    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&xxh32(&payload, XXHASH_SEED).to_le_bytes());
    bytes.extend_from_slice(&payload);
    bytes
}

/// Decode snapshot bytes, verifying the header before touching the
/// payload: magic first, then version, then length, then checksum.
pub fn decode_bytes(bytes: &[u8]) -> Result<(Catalogue, Planner), SnapshotError> {
    if bytes.len() < HEADER_SIZE {
        return Err(SnapshotError::TruncatedHeader { len: bytes.len() });
    }
    if bytes[..4] != MAGIC {
        return Err(SnapshotError::BadMagic {
            found: [bytes[0], bytes[1], bytes[2], bytes[3]],
        });
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: version,
            supported: FORMAT_VERSION,
        });
    }
    let declared = u64::from_le_bytes([
        bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    ]);
    let checksum = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);

    let payload = &bytes[HEADER_SIZE..];
    if declared != payload.len() as u64 {
        return Err(SnapshotError::PayloadLength {
            declared,
            actual: payload.len(),
        });
    }
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != checksum {
        return Err(SnapshotError::ChecksumMismatch {
            expected: checksum,
            computed,
        });
    }

    restore(bitcode::decode(payload)?)
}

fn payload_from(catalogue: &Catalogue, planner: &Planner) -> SnapshotPayload {
    let stops = catalogue
        .stops()
        .iter()
        .map(|stop| StopRecord {
            name: stop.name.clone(),
            latitude: stop.latitude(),
            longitude: stop.longitude(),
        })
        .collect();

    // The index iterates a hash map; sort so the bytes are reproducible.
    let mut distances: Vec<DistanceRecord> = catalogue
        .distances()
        .declared()
        .map(|(from, to, meters)| DistanceRecord {
            from: from.0,
            to: to.0,
            meters,
        })
        .collect();
    distances.sort_by_key(|record| (record.from, record.to));

    let buses = catalogue
        .buses()
        .iter()
        .map(|line| BusRecord {
            name: line.name.clone(),
            circular: line.kind == LineKind::Circular,
            stops: line.stops.iter().map(|id| id.0).collect(),
        })
        .collect();

    let graph = planner.graph();
    let edges = graph
        .edges()
        .iter()
        .map(|edge| EdgeRecord {
            from: edge.from.0,
            to: edge.to.0,
            step: StepRecord::from(&edge.weight),
        })
        .collect();
    let incidence = graph
        .incidence_lists()
        .iter()
        .map(|list| list.iter().map(|id| id.0).collect())
        .collect();

    let table = planner
        .router()
        .entries()
        .iter()
        .map(|row| {
            row.iter()
                .map(|entry| {
                    entry.map(|entry| PathEntryRecord {
                        total: entry.total,
                        prev_edge: entry.prev_edge.map(|id| id.0),
                    })
                })
                .collect()
        })
        .collect();

    let stop_vertices = planner
        .stop_vertices()
        .iter()
        .map(|(name, vertices)| StopVertexRecord {
            name: name.clone(),
            arrival: vertices.arrival.0,
            departure: vertices.departure.0,
        })
        .collect();

    SnapshotPayload {
        bus_wait_time: planner.settings().bus_wait_time,
        bus_velocity: planner.settings().bus_velocity,
        stops,
        distances,
        buses,
        vertex_count: graph.vertex_count(),
        edges,
        incidence,
        table,
        stop_vertices,
    }
}

fn restore(payload: SnapshotPayload) -> Result<(Catalogue, Planner), SnapshotError> {
    let settings = RoutingSettings {
        bus_wait_time: payload.bus_wait_time,
        bus_velocity: payload.bus_velocity,
    };

    // Stops re-added in recorded order get the same ids they were
    // snapshotted with, so index references below stay valid.
    let mut catalogue = Catalogue::new();
    for stop in &payload.stops {
        catalogue.add_stop(&stop.name, stop.latitude, stop.longitude)?;
    }
    for record in &payload.distances {
        catalogue.set_distance(
            stop_name(&payload.stops, record.from)?,
            stop_name(&payload.stops, record.to)?,
            record.meters,
        )?;
    }
    for bus in &payload.buses {
        let mut names = Vec::with_capacity(bus.stops.len());
        for &id in &bus.stops {
            names.push(stop_name(&payload.stops, id)?);
        }
        let kind = if bus.circular {
            LineKind::Circular
        } else {
            LineKind::Linear
        };
        catalogue.add_bus(&bus.name, &names, kind)?;
    }

    let vertex_count = payload.vertex_count;
    let edge_count = payload.edges.len();

    let mut labels: HashMap<String, Arc<str>> = HashMap::new();
    let mut edges = Vec::with_capacity(edge_count);
    for record in &payload.edges {
        if record.from >= vertex_count || record.to >= vertex_count {
            return Err(SnapshotError::Inconsistent("edge endpoint out of range"));
        }
        let weight = match &record.step {
            StepRecord::Wait { stop, minutes } => RouteStep::Wait {
                stop: interned(&mut labels, stop),
                minutes: *minutes,
            },
            StepRecord::Ride { bus, span, minutes } => RouteStep::Ride {
                bus: interned(&mut labels, bus),
                span: *span,
                minutes: *minutes,
            },
        };
        edges.push(Edge {
            from: VertexId(record.from),
            to: VertexId(record.to),
            weight,
        });
    }

    if payload.incidence.len() != vertex_count {
        return Err(SnapshotError::Inconsistent(
            "incidence list count differs from vertex count",
        ));
    }
    let mut incidence = Vec::with_capacity(vertex_count);
    for list in &payload.incidence {
        let mut ids = Vec::with_capacity(list.len());
        for &id in list {
            if id >= edge_count {
                return Err(SnapshotError::Inconsistent(
                    "incidence entry names an unknown edge",
                ));
            }
            ids.push(EdgeId(id));
        }
        incidence.push(ids);
    }
    let graph = Arc::new(DirectedWeightedGraph::from_parts(edges, incidence));

    if payload.table.len() != vertex_count
        || payload.table.iter().any(|row| row.len() != vertex_count)
    {
        return Err(SnapshotError::Inconsistent(
            "path table dimensions differ from vertex count",
        ));
    }
    let mut table = Vec::with_capacity(vertex_count);
    for row in &payload.table {
        let mut entries = Vec::with_capacity(vertex_count);
        for entry in row {
            let entry = match entry {
                None => None,
                Some(record) => {
                    if let Some(edge) = record.prev_edge
                        && edge >= edge_count
                    {
                        return Err(SnapshotError::Inconsistent(
                            "path table names an unknown edge",
                        ));
                    }
                    Some(PathEntry {
                        total: record.total,
                        prev_edge: record.prev_edge.map(EdgeId),
                    })
                }
            };
            entries.push(entry);
        }
        table.push(entries);
    }
    let router = Router::from_parts(Arc::clone(&graph), table);

    let mut stop_vertices = BTreeMap::new();
    for record in &payload.stop_vertices {
        if record.arrival >= vertex_count || record.departure >= vertex_count {
            return Err(SnapshotError::Inconsistent("stop vertex out of range"));
        }
        stop_vertices.insert(
            record.name.clone(),
            StopVertices {
                arrival: VertexId(record.arrival),
                departure: VertexId(record.departure),
            },
        );
    }

    debug!(
        stops = catalogue.stops().len(),
        vertices = vertex_count,
        edges = edge_count,
        "snapshot restored"
    );
    Ok((
        catalogue,
        Planner::from_parts(settings, graph, router, stop_vertices),
    ))
}

fn stop_name(stops: &[StopRecord], id: u32) -> Result<&str, SnapshotError> {
    stops
        .get(id as usize)
        .map(|record| record.name.as_str())
        .ok_or(SnapshotError::Inconsistent("record names an unknown stop"))
}

/// Edge labels repeat heavily (one per ride edge), so restored steps
/// share one handle per distinct name, as the builder produces.
fn interned(cache: &mut HashMap<String, Arc<str>>, name: &str) -> Arc<str> {
    if let Some(handle) = cache.get(name) {
        return Arc::clone(handle);
    }
    let handle: Arc<str> = Arc::from(name);
    cache.insert(name.to_string(), Arc::clone(&handle));
    handle
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let mut file = std::fs::File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    std::fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteStep;
    use tempfile::tempdir;

    fn built_network() -> (Catalogue, Planner) {
        let mut catalogue = Catalogue::new();
        catalogue.add_stop("Depot", 55.574371, 37.6517).unwrap();
        catalogue.add_stop("Market", 55.587655, 37.645687).unwrap();
        catalogue.add_stop("Park", 55.592028, 37.653656).unwrap();
        catalogue.set_distance("Depot", "Market", 2600.0).unwrap();
        catalogue.set_distance("Market", "Park", 890.0).unwrap();
        catalogue.set_distance("Park", "Market", 850.0).unwrap();
        catalogue
            .add_bus("297", &["Depot", "Market", "Park", "Depot"], LineKind::Circular)
            .unwrap();
        catalogue
            .add_bus("635", &["Market", "Park"], LineKind::Linear)
            .unwrap();
        catalogue.set_distance("Park", "Depot", 2500.0).unwrap();

        let planner = Planner::new(
            &catalogue,
            RoutingSettings {
                bus_wait_time: 6.0,
                bus_velocity: 40.0,
            },
        )
        .unwrap();
        (catalogue, planner)
    }

    #[test]
    fn round_trip_restores_identical_answers() {
        let (catalogue, planner) = built_network();
        let dir = tempdir().unwrap();
        let path = dir.path().join("network.snapshot");

        save(&path, &catalogue, &planner).unwrap();
        let (restored_catalogue, restored_planner) = load(&path).unwrap();

        assert_eq!(restored_catalogue.stops().len(), catalogue.stops().len());
        assert_eq!(restored_catalogue.buses().len(), catalogue.buses().len());
        assert_eq!(
            restored_catalogue.line_summary("297").unwrap(),
            catalogue.line_summary("297").unwrap()
        );
        assert_eq!(
            restored_catalogue.buses_at("Market").unwrap(),
            catalogue.buses_at("Market").unwrap()
        );

        assert_eq!(
            restored_planner.graph().edge_count(),
            planner.graph().edge_count()
        );
        assert_eq!(restored_planner.router().entries(), planner.router().entries());
        for (from, to) in [("Depot", "Park"), ("Park", "Depot"), ("Market", "Market")] {
            assert_eq!(restored_planner.plan(from, to), planner.plan(from, to));
        }
    }

    #[test]
    fn restored_steps_share_label_handles() {
        let (catalogue, planner) = built_network();
        let (_, restored) = decode_bytes(&encode_bytes(&catalogue, &planner)).unwrap();

        let mut labels: Vec<Arc<str>> = Vec::new();
        for edge in restored.graph().edges() {
            if let RouteStep::Ride { bus, .. } = &edge.weight
                && &**bus == "297"
            {
                labels.push(Arc::clone(bus));
            }
        }
        assert!(labels.len() > 1);
        assert!(labels.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[test]
    fn encoding_is_deterministic() {
        let (catalogue, planner) = built_network();
        assert_eq!(
            encode_bytes(&catalogue, &planner),
            encode_bytes(&catalogue, &planner)
        );
    }

    #[test]
    fn header_starts_with_magic() {
        let (catalogue, planner) = built_network();
        let bytes = encode_bytes(&catalogue, &planner);
        assert_eq!(&bytes[..4], b"TCAT");
        assert!(bytes.len() > HEADER_SIZE);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let (catalogue, planner) = built_network();
        let mut bytes = encode_bytes(&catalogue, &planner);
        bytes[0] = b'X';
        assert!(matches!(
            decode_bytes(&bytes),
            Err(SnapshotError::BadMagic { .. })
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        let (catalogue, planner) = built_network();
        let mut bytes = encode_bytes(&catalogue, &planner);
        bytes[4..8].copy_from_slice(&99u32.to_le_bytes());
        assert!(matches!(
            decode_bytes(&bytes),
            Err(SnapshotError::UnsupportedVersion {
                found: 99,
                supported: FORMAT_VERSION
            })
        ));
    }

    #[test]
    fn truncation_is_detected() {
        let (catalogue, planner) = built_network();
        let bytes = encode_bytes(&catalogue, &planner);

        assert!(matches!(
            decode_bytes(&bytes[..10]),
            Err(SnapshotError::TruncatedHeader { len: 10 })
        ));
        assert!(matches!(
            decode_bytes(&bytes[..bytes.len() - 1]),
            Err(SnapshotError::PayloadLength { .. })
        ));
    }

    #[test]
    fn corruption_is_detected() {
        let (catalogue, planner) = built_network();
        let mut bytes = encode_bytes(&catalogue, &planner);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            decode_bytes(&bytes),
            Err(SnapshotError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("absent.snapshot")),
            Err(SnapshotError::Io { action: "read", .. })
        ));
    }

    #[test]
    fn save_creates_parents_and_leaves_no_temp_file() {
        let (catalogue, planner) = built_network();
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("network.snapshot");

        save(&path, &catalogue, &planner).unwrap();

        assert!(path.exists());
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());
    }
}
