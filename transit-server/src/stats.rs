//! Batch stat requests and their JSON answers.
//!
//! A stat document is `{"stat_requests": [...]}` where every request
//! carries an integer `id`, echoed back as `request_id` so callers can
//! match answers to questions. Answers preserve request order, and a
//! request that cannot be answered yields an `error_message` object in
//! its slot rather than failing the batch.

use serde::{Deserialize, Serialize};

use crate::catalogue::{Catalogue, CatalogueError, LineSummary};
use crate::routing::{Itinerary, Planner, RouteStep};

/// A batch of stat requests.
#[derive(Debug, Deserialize)]
pub struct StatDocument {
    pub stat_requests: Vec<StatRequest>,
}

/// One query against the loaded network.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum StatRequest {
    Bus { id: i64, name: String },
    Stop { id: i64, name: String },
    Route { id: i64, from: String, to: String },
}

/// Line statistics as serialized to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusStats {
    pub curvature: f64,
    pub route_length: f64,
    pub stop_count: usize,
    pub unique_stop_count: usize,
}

impl From<LineSummary> for BusStats {
    fn from(summary: LineSummary) -> Self {
        Self {
            curvature: summary.curvature,
            route_length: summary.length_meters,
            stop_count: summary.stop_count,
            unique_stop_count: summary.unique_stop_count,
        }
    }
}

/// The sorted bus names serving a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopBuses {
    pub buses: Vec<String>,
}

/// An itinerary as serialized to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub total_time: f64,
    pub items: Vec<ItineraryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ItineraryItem {
    Wait {
        stop_name: String,
        time: f64,
    },
    Bus {
        bus: String,
        span_count: u32,
        time: f64,
    },
}

impl From<&RouteStep> for ItineraryItem {
    fn from(step: &RouteStep) -> Self {
        match step {
            RouteStep::Wait { stop, minutes } => ItineraryItem::Wait {
                stop_name: stop.to_string(),
                time: *minutes,
            },
            RouteStep::Ride { bus, span, minutes } => ItineraryItem::Bus {
                bus: bus.to_string(),
                span_count: *span,
                time: *minutes,
            },
        }
    }
}

impl From<&Itinerary> for RouteSummary {
    fn from(itinerary: &Itinerary) -> Self {
        Self {
            total_time: itinerary.total_minutes,
            items: itinerary.steps.iter().map(ItineraryItem::from).collect(),
        }
    }
}

/// One answer. Untagged: the variant shapes are disjoint on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatResponse {
    Bus {
        request_id: i64,
        #[serde(flatten)]
        stats: BusStats,
    },
    Stop {
        request_id: i64,
        #[serde(flatten)]
        stop: StopBuses,
    },
    Route {
        request_id: i64,
        #[serde(flatten)]
        route: RouteSummary,
    },
    Error {
        request_id: i64,
        error_message: String,
    },
}

impl StatResponse {
    fn not_found(request_id: i64) -> Self {
        StatResponse::Error {
            request_id,
            error_message: "not found".to_string(),
        }
    }
}

/// Answer a single request. Failures become `error_message` answers,
/// never panics or batch aborts.
pub fn answer(catalogue: &Catalogue, planner: &Planner, request: &StatRequest) -> StatResponse {
    match request {
        StatRequest::Bus { id, name } => match catalogue.line_summary(name) {
            Ok(summary) => StatResponse::Bus {
                request_id: *id,
                stats: summary.into(),
            },
            Err(CatalogueError::UnknownBus(_)) => StatResponse::not_found(*id),
            // A known line over broken distance data still gets a reply.
            Err(other) => StatResponse::Error {
                request_id: *id,
                error_message: other.to_string(),
            },
        },
        StatRequest::Stop { id, name } => match catalogue.buses_at(name) {
            Ok(buses) if buses.is_empty() => StatResponse::Error {
                request_id: *id,
                error_message: "no buses".to_string(),
            },
            Ok(buses) => StatResponse::Stop {
                request_id: *id,
                stop: StopBuses {
                    buses: buses.into_iter().map(str::to_string).collect(),
                },
            },
            Err(_) => StatResponse::not_found(*id),
        },
        StatRequest::Route { id, from, to } => match planner.plan(from, to) {
            Ok(Some(itinerary)) => StatResponse::Route {
                request_id: *id,
                route: RouteSummary::from(&itinerary),
            },
            Ok(None) | Err(_) => StatResponse::not_found(*id),
        },
    }
}

/// Answer a whole document, one response per request, in order.
pub fn process_document(
    catalogue: &Catalogue,
    planner: &Planner,
    document: &StatDocument,
) -> Vec<StatResponse> {
    document
        .stat_requests
        .iter()
        .map(|request| answer(catalogue, planner, request))
        .collect()
}
