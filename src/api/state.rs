use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::brand::Brand;
use crate::data::DataStore;
use crate::reagents::ReagentService;

/// Shared state of the web handlers
pub struct AppState {
    pub store: Arc<DataStore>,
    pub reagents: Arc<ReagentService>,
    pub brand: Brand,
    /// Generated once from `brand`
    pub brand_css: String,
    pub title: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Arc<DataStore>,
        reagents: Arc<ReagentService>,
        brand: Brand,
        title: impl Into<String>,
    ) -> Self {
        let brand_css = brand.generate_css();
        Self {
            store,
            reagents,
            brand,
            brand_css,
            title: title.into(),
            started_at: Utc::now(),
        }
    }

    /// Logo path under `/assets`, if the brand names one
    pub fn logo_url(&self) -> Option<String> {
        self.brand
            .logo
            .as_deref()
            .filter(|logo| !logo.is_empty())
            .map(|logo| format!("/assets/{}", logo.trim_start_matches('/')))
    }
}
