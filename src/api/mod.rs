//! Web UI and JSON API

pub mod helpers;
pub mod middleware;
pub mod services;
mod state;
pub mod views;

use actix_web::{HttpResponse, web};

pub use state::AppState;

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body("Not Found")
}

/// Register every route; the caller adds `web::Data<AppState>` and middleware
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(services::health_routes())
        .service(services::asset_routes())
        .service(services::api_routes())
        .configure(services::page_routes)
        .configure(services::reagent_routes)
        .default_service(web::to(not_found));
}
