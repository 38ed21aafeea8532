//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalogue::CatalogueError;
use crate::routing::UnknownStop;
use crate::stats::{self, BusStats, RouteSummary, StatDocument, StatResponse, StopBuses};

use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/bus", get(bus_summary))
        .route("/api/stop", get(stop_buses))
        .route("/api/route", get(plan_route))
        .route("/api/stats", post(process_stats))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct NameQuery {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RouteQuery {
    from: String,
    to: String,
}

/// Line statistics by bus name.
async fn bus_summary(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<BusStats>, AppError> {
    let summary = state.catalogue.line_summary(&query.name)?;
    Ok(Json(summary.into()))
}

/// Buses serving a stop.
async fn stop_buses(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<StopBuses>, AppError> {
    let buses = state.catalogue.buses_at(&query.name)?;
    if buses.is_empty() {
        return Err(AppError::NotFound {
            message: "no buses".to_string(),
        });
    }
    Ok(Json(StopBuses {
        buses: buses.into_iter().map(str::to_string).collect(),
    }))
}

/// Fastest itinerary between two stops.
async fn plan_route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteSummary>, AppError> {
    let itinerary = state
        .planner
        .plan(&query.from, &query.to)?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(RouteSummary::from(&itinerary)))
}

/// Batch stat-request document, answered in order.
async fn process_stats(
    State(state): State<AppState>,
    Json(document): Json<StatDocument>,
) -> Json<Vec<StatResponse>> {
    Json(stats::process_document(
        &state.catalogue,
        &state.planner,
        &document,
    ))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
    Internal { message: String },
}

impl AppError {
    fn not_found() -> Self {
        AppError::NotFound {
            message: "not found".to_string(),
        }
    }
}

impl From<CatalogueError> for AppError {
    fn from(e: CatalogueError) -> Self {
        match e {
            CatalogueError::UnknownStop(_) | CatalogueError::UnknownBus(_) => AppError::not_found(),
            other => AppError::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl From<UnknownStop> for AppError {
    fn from(_: UnknownStop) -> Self {
        AppError::not_found()
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error_message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(status = %status, message = %message, "request failed");

        let body = Json(ErrorResponse {
            error_message: message,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineKind;
    use crate::routing::RoutingSettings;

    fn state() -> AppState {
        let mut catalogue = crate::catalogue::Catalogue::new();
        catalogue.add_stop("Depot", 55.574371, 37.6517).unwrap();
        catalogue.add_stop("Market", 55.587655, 37.645687).unwrap();
        catalogue.add_stop("Lonely", 55.6, 37.66).unwrap();
        catalogue.set_distance("Depot", "Market", 1000.0).unwrap();
        catalogue
            .add_bus("9", &["Depot", "Market"], LineKind::Linear)
            .unwrap();
        let planner = crate::routing::Planner::new(
            &catalogue,
            RoutingSettings {
                bus_wait_time: 6.0,
                bus_velocity: 60.0,
            },
        )
        .unwrap();
        AppState::new(catalogue, planner)
    }

    #[tokio::test]
    async fn bus_summary_answers_known_lines() {
        let response = bus_summary(
            State(state()),
            Query(NameQuery {
                name: "9".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.stop_count, 3);
        assert_eq!(response.0.unique_stop_count, 2);
    }

    #[tokio::test]
    async fn unknown_names_map_to_not_found() {
        let bus = bus_summary(
            State(state()),
            Query(NameQuery {
                name: "751".to_string(),
            }),
        )
        .await;
        assert!(matches!(bus, Err(AppError::NotFound { .. })));

        let route = plan_route(
            State(state()),
            Query(RouteQuery {
                from: "Nowhere".to_string(),
                to: "Depot".to_string(),
            }),
        )
        .await;
        assert!(matches!(route, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn unserved_stop_reports_no_buses() {
        let response = stop_buses(
            State(state()),
            Query(NameQuery {
                name: "Lonely".to_string(),
            }),
        )
        .await;
        match response {
            Err(AppError::NotFound { message }) => assert_eq!(message, "no buses"),
            other => panic!("expected not-found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn route_returns_items_in_ride_order() {
        let response = plan_route(
            State(state()),
            Query(RouteQuery {
                from: "Depot".to_string(),
                to: "Market".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.items.len(), 2);
    }

    #[tokio::test]
    async fn stats_endpoint_answers_batches() {
        let document: StatDocument = serde_json::from_str(
            r#"{"stat_requests": [
                {"id": 1, "type": "Bus", "name": "9"},
                {"id": 2, "type": "Stop", "name": "Nowhere"}
            ]}"#,
        )
        .unwrap();
        let responses = process_stats(State(state()), Json(document)).await;
        assert_eq!(responses.0.len(), 2);
        assert!(matches!(responses.0[1], StatResponse::Error { .. }));
    }

    #[test]
    fn error_responses_carry_the_status() {
        let response = AppError::not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::Internal {
            message: "broken".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
