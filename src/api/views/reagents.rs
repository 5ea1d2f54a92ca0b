//! Reagent registration pages

use std::fmt::Write;

use chrono::Local;

use crate::reagents::{ConnectionStatus, INDEX_SET_LETTERS, PendingLot, REAGENT_TYPES, ReagentQueue};
use crate::utils::html::escape;

fn status_badge(status: &ConnectionStatus) -> String {
    let class = if status.connected {
        "alert-success"
    } else {
        "alert-error"
    };
    format!(
        r#"<div class="alert {}">Clarity LIMS: {}</div>"#,
        class,
        escape(&status.message)
    )
}

fn add_form(queue: &ReagentQueue) -> String {
    let mut types = String::new();
    for reagent in REAGENT_TYPES.iter() {
        let _ = write!(
            types,
            r#"<option value="{}">{} ({})</option>"#,
            escape(reagent.short_name),
            escape(reagent.name),
            escape(reagent.category)
        );
    }
    let mut letters = String::new();
    for letter in INDEX_SET_LETTERS {
        let _ = write!(letters, r#"<option value="{0}">{0}</option>"#, letter);
    }
    let expiry = queue
        .last_expiry()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    format!(
        r#"<div class="card"><div class="card-header">Add reagent lot</div><div class="card-body">
<form method="post" action="/reagents/queue" class="inline-form">
<label>Reagent type <select name="reagent_type">{types}</select></label>
<label>Index set <select name="set_letter">{letters}</select></label>
<label>Lot number <input type="text" name="lot_number" required></label>
<label>Received <input type="date" name="received_date" value="{today}"></label>
<label>Expiry <input type="date" name="expiry_date" value="{expiry}" required></label>
<button type="submit" class="btn">Add to queue</button>
</form></div></div>"#,
        types = types,
        letters = letters,
        today = Local::now().format("%Y-%m-%d"),
        expiry = expiry,
    )
}

/// Table of queued lots
pub fn pending_table(lots: &[PendingLot]) -> String {
    let mut out = String::from(
        r#"<table class="data-table" data-paging="false"><thead><tr><th>Internal name</th><th>Reagent</th><th>Lot number</th><th>Received</th><th>Expiry</th></tr></thead><tbody>"#,
    );
    for lot in lots {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&lot.internal_name),
            escape(lot.reagent_type.name),
            escape(&lot.lot_number),
            lot.received_date.format("%Y-%m-%d"),
            lot.expiry_date.format("%Y-%m-%d"),
        );
    }
    out.push_str("</tbody></table>");
    out
}

fn results_table(queue: &ReagentQueue) -> String {
    if queue.results().is_empty() {
        return String::new();
    }
    let mut out = String::from(
        r#"<div class="card"><div class="card-header">Last submission</div><div class="card-body"><table class="data-table" data-paging="false"><thead><tr><th>Name</th><th>Status</th><th>LIMS ID</th><th>Message</th></tr></thead><tbody>"#,
    );
    for result in queue.results() {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"left-column\">{}</td></tr>",
            escape(&result.name),
            if result.success { "Created" } else { "Failed" },
            escape(result.lims_id.as_deref().unwrap_or("")),
            escape(&result.message),
        );
    }
    out.push_str("</tbody></table></div></div>");
    out
}

/// Body of `/reagents`
pub fn render_reagents(queue: &ReagentQueue, status: &ConnectionStatus) -> String {
    let mut body = status_badge(status);
    body.push_str(&add_form(queue));

    let _ = write!(
        body,
        r#"<div class="card"><div class="card-header">Queue ({} lots)</div><div class="card-body">"#,
        queue.pending().len()
    );
    if !queue.in_flight().is_empty() {
        let _ = write!(
            body,
            r#"<p class="alert alert-info">{} lots are being submitted.</p>"#,
            queue.in_flight().len()
        );
    }
    if queue.pending().is_empty() {
        body.push_str("<p>No lots queued.</p>");
    } else {
        body.push_str(&pending_table(queue.pending()));
        body.push_str(
            r#"<form method="post" action="/reagents/submit" class="inline-form"><button type="submit" class="btn">Submit to LIMS</button></form>"#,
        );
    }
    body.push_str(
        r#"<form method="post" action="/reagents/clear" class="inline-form"><button type="submit" class="btn btn-danger">Clear</button></form></div></div>"#,
    );
    body.push_str(&results_table(queue));
    body
}

/// Confirmation step before submitting
pub fn render_confirm(lots: &[PendingLot], base_url: &str) -> String {
    format!(
        r#"<div class="card"><div class="card-header">Create {} reagent lots in {}?</div><div class="card-body">{}
<form method="post" action="/reagents/submit" class="inline-form"><input type="hidden" name="confirm" value="true"><button type="submit" class="btn">Confirm</button></form>
<a class="btn btn-secondary" href="/reagents">Cancel</a>
</div></div>"#,
        lots.len(),
        escape(base_url),
        pending_table(lots)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_sequence_numbers;
    use crate::reagents::LotRequest;

    #[test]
    fn page_lists_queue_and_prefills_expiry() {
        let mut queue = ReagentQueue::new(default_sequence_numbers());
        queue
            .add(&LotRequest {
                reagent_type: "IDT-Index".to_string(),
                set_letter: Some("B".to_string()),
                lot_number: "<L1>".to_string(),
                received_date: None,
                expiry_date: Some("2026-05-01".to_string()),
            })
            .unwrap();
        let status = ConnectionStatus {
            connected: false,
            message: "Connection error: refused".to_string(),
        };

        let html = render_reagents(&queue, &status);
        assert!(html.contains("Queue (1 lots)"));
        assert!(html.contains("<td>B#46 (192)</td>"));
        assert!(html.contains("&lt;L1&gt;"));
        assert!(html.contains(r#"value="2026-05-01""#));
        assert!(html.contains("alert-error"));
    }

    #[test]
    fn confirm_posts_confirm_flag() {
        let html = render_confirm(&[], "https://lims.example.org/api/v2");
        assert!(html.contains(r#"name="confirm" value="true""#));
    }
}
