//! Page shell shared by every HTML page

use std::fmt::Write;

use crate::api::AppState;
use crate::data::{FormattedUpdateInfo, TableKind};
use crate::utils::html::escape;

/// Web font named by the default brand
pub const FONT_STYLESHEET: &str = "https://fonts.googleapis.com/css2?family=Hanken+Grotesk:ital,wght@0,400;0,500;0,600;1,400;1,500;1,600&display=swap";

/// Navigation target highlighted in the navbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Table(TableKind),
    Reagents,
    None,
}

pub struct Alert {
    pub class: &'static str,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            class: "alert-error",
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            class: "alert-success",
            message: message.into(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            r#"<div class="alert {}" role="alert">{}</div>"#,
            self.class,
            escape(&self.message)
        )
    }
}

fn nav_links(active: NavItem) -> String {
    let mut out = String::new();
    let items = TableKind::all()
        .map(|kind| (NavItem::Table(kind), format!("/{}", kind.slug()), kind.title()))
        .chain(std::iter::once((NavItem::Reagents, "/reagents".to_string(), "Reagents")));

    for (item, href, label) in items {
        let class = if item == active { "nav-link active" } else { "nav-link" };
        let _ = write!(out, r#"<a class="{}" href="{}">{}</a>"#, class, href, label);
    }
    out
}

/// Tooltip listing the update time of every table
pub fn update_tooltip(info: &FormattedUpdateInfo) -> String {
    let mut rows = String::new();
    for (label, stamp) in &info.tables {
        let _ = write!(rows, "<div><b>{}:</b> {}</div>", escape(label), escape(stamp));
    }
    format!(
        r#"<span class="tooltip" tabindex="0">Last update: {}<span class="tooltip-body">{}<hr><div><b>App refreshed:</b> {}</div></span></span>"#,
        escape(&info.last_update),
        rows,
        escape(&info.app_refresh)
    )
}

/// Wrap `body` in the page shell
pub fn render_page(state: &AppState, active: NavItem, heading: &str, body: &str) -> String {
    let snapshot = state.store.snapshot();
    let updates = snapshot.update_info.formatted(snapshot.loaded_at);

    let logo = state
        .logo_url()
        .map(|src| format!(r#"<img src="{}" alt="">"#, escape(&src)))
        .unwrap_or_default();

    let load_error = state
        .store
        .last_error()
        .map(|e| Alert::error(format!("Data could not be loaded: {}", e)).render())
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{heading} | {title}</title>
<link rel="preconnect" href="https://fonts.googleapis.com">
<link rel="stylesheet" href="{fonts}">
<link rel="stylesheet" href="/assets/brand.css">
<link rel="stylesheet" href="/assets/styles.css">
<link rel="stylesheet" href="https://cdn.datatables.net/2.1.8/css/dataTables.dataTables.min.css">
<script src="https://code.jquery.com/jquery-3.7.1.min.js"></script>
<script src="https://cdn.datatables.net/2.1.8/js/dataTables.min.js"></script>
</head>
<body>
<nav class="navbar">
<a class="navbar-brand" href="/">{logo}<span>{title}</span></a>
<div class="navbar-nav">{links}</div>
<div class="navbar-actions">
{tooltip}
<form method="post" action="/refresh" class="inline-form"><button type="submit" class="btn btn-secondary">Refresh SQL db connection</button></form>
</div>
</nav>
<main>
{load_error}
<h1>{heading}</h1>
{body}
</main>
<script>
document.querySelectorAll("table.data-table").forEach(function (t) {{ new DataTable(t); }});
</script>
</body>
</html>
"#,
        heading = escape(heading),
        title = escape(&state.title),
        fonts = FONT_STYLESHEET,
        logo = logo,
        links = nav_links(active),
        tooltip = update_tooltip(&updates),
        load_error = load_error,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tooltip_lists_tables() {
        let info = FormattedUpdateInfo {
            tables: vec![
                ("Projects".to_string(), "2025-01-02 03:04".to_string()),
                ("Samples".to_string(), "Unknown".to_string()),
            ],
            last_update: "2025-01-02 03:04".to_string(),
            app_refresh: "2025-01-03 08:00".to_string(),
        };
        let html = update_tooltip(&info);
        assert!(html.starts_with(r#"<span class="tooltip""#));
        assert!(html.contains("<b>Samples:</b> Unknown"));
        assert!(html.contains("<b>App refreshed:</b> 2025-01-03 08:00"));
    }

    #[test]
    fn active_link_is_marked() {
        let links = nav_links(NavItem::Reagents);
        assert!(links.contains(r#"<a class="nav-link active" href="/reagents">"#));
        assert!(links.contains(r#"<a class="nav-link" href="/projects">Projects</a>"#));
    }
}
