//! Embedded stylesheets and images

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use rust_embed::Embed;
use tracing::{debug, trace};

use crate::api::AppState;

#[derive(Embed)]
#[folder = "assets/"]
struct StaticAssets;

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("yml") | Some("yaml") => "text/yaml; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Stylesheet generated from the brand file
pub async fn brand_css(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .append_header((header::CACHE_CONTROL, "no-cache"))
        .body(state.brand_css.clone())
}

pub async fn static_asset(req: HttpRequest) -> HttpResponse {
    let path = req.match_info().query("path");
    trace!("Serving asset: {}", path);

    match StaticAssets::get(path) {
        Some(file) => HttpResponse::Ok()
            .content_type(content_type(path))
            .append_header((header::CACHE_CONTROL, "public, max-age=3600"))
            .body(file.data.into_owned()),
        None => {
            debug!("Asset not found: {}", path);
            HttpResponse::NotFound().body("File not found")
        }
    }
}

pub fn asset_routes() -> actix_web::Scope {
    web::scope("/assets")
        .route("/brand.css", web::get().to(brand_css))
        .route("/{path:.*}", web::get().to(static_asset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_is_embedded() {
        assert!(StaticAssets::get("styles.css").is_some());
        assert_eq!(content_type("styles.css"), "text/css; charset=utf-8");
        assert_eq!(content_type("nvi-logo.svg"), "image/svg+xml");
    }
}
