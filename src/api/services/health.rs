use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, trace, warn};

use crate::api::AppState;
use crate::api::helpers::{ErrorCode, json_response};
use crate::data::{TableKind, UpdateMethod};

#[derive(Debug, Serialize)]
pub struct TableCount {
    pub kind: TableKind,
    pub rows: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: u64,
    pub pin: String,
    pub tables: Vec<TableCount>,
    pub update_method: UpdateMethod,
    pub loaded_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub response_time_ms: u32,
}

pub struct HealthService;

impl HealthService {
    /// Unhealthy while the last load or refresh has failed
    pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let snapshot = state.store.snapshot();
        let error = state.store.last_error();
        let healthy = error.is_none();
        let now = chrono::Utc::now();

        let data = HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" },
            timestamp: now.to_rfc3339(),
            uptime: (now - state.started_at).num_seconds().max(0) as u64,
            pin: state.store.database().pin().to_string(),
            tables: TableKind::all()
                .map(|kind| TableCount {
                    kind,
                    rows: snapshot.table(kind).len(),
                })
                .collect(),
            update_method: snapshot.update_info.method,
            loaded_at: snapshot.loaded_at.to_rfc3339(),
            error,
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        if healthy {
            info!("Health check completed in {:?}, status: healthy", start_time.elapsed());
            json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
        } else {
            warn!("Health check completed in {:?}, status: unhealthy", start_time.elapsed());
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "Service Unavailable",
                Some(data),
            )
        }
    }

    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");
        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");
        HttpResponse::NoContent().finish()
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
