//! Reagent registration pages

use actix_web::{HttpResponse, http::StatusCode, http::header, web};
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::AppState;
use crate::api::views::reagents::{render_confirm, render_reagents};
use crate::api::views::{Alert, NavItem, render_page};
use crate::reagents::LotRequest;

const PAGE_TITLE: &str = "Reagent registration";

#[derive(Debug, Default, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl SubmitForm {
    fn confirmed(&self) -> bool {
        self.confirm
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

fn back_to_page() -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/reagents"))
        .finish()
}

async fn page(state: &AppState, status: StatusCode, alert: Option<Alert>) -> HttpResponse {
    let connection = state.reagents.connection_status().await;
    let mut body = alert.map(|a| a.render()).unwrap_or_default();
    body.push_str(&render_reagents(&state.reagents.queue(), &connection));

    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(render_page(state, NavItem::Reagents, PAGE_TITLE, &body))
}

pub async fn reagents_page(state: web::Data<AppState>) -> HttpResponse {
    page(&state, StatusCode::OK, None).await
}

pub async fn queue_lot(state: web::Data<AppState>, form: web::Form<LotRequest>) -> HttpResponse {
    match state.reagents.add(&form) {
        Ok(_) => back_to_page(),
        Err(e) => {
            warn!("Rejected reagent lot: {}", e);
            page(&state, e.http_status(), Some(Alert::error(e.message()))).await
        }
    }
}

pub async fn clear_queue(state: web::Data<AppState>) -> HttpResponse {
    state.reagents.clear();
    info!("Reagent queue cleared");
    back_to_page()
}

/// Without `confirm=true` only the confirmation page is shown
pub async fn submit_queue(state: web::Data<AppState>, form: web::Form<SubmitForm>) -> HttpResponse {
    if !form.confirmed() {
        let queue = state.reagents.queue();
        if queue.pending().is_empty() {
            return page(
                &state,
                StatusCode::BAD_REQUEST,
                Some(Alert::error("No lots to submit")),
            )
            .await;
        }
        let body = render_confirm(queue.pending(), state.reagents.base_url());
        return HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_page(&state, NavItem::Reagents, PAGE_TITLE, &body));
    }

    match state.reagents.submit().await {
        Ok(results) => {
            let created = results.iter().filter(|r| r.success).count();
            let alert = if created == results.len() {
                Alert::success(format!("Created {} reagent lots", created))
            } else {
                Alert::error(format!(
                    "{} of {} lots failed; failed lots remain queued",
                    results.len() - created,
                    results.len()
                ))
            };
            page(&state, StatusCode::OK, Some(alert)).await
        }
        Err(e) => page(&state, e.http_status(), Some(Alert::error(e.message()))).await,
    }
}

pub fn reagent_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/reagents", web::get().to(reagents_page))
        .route("/reagents/queue", web::post().to(queue_lot))
        .route("/reagents/clear", web::post().to(clear_queue))
        .route("/reagents/submit", web::post().to(submit_queue));
}
