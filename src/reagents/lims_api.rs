//! Clarity LIMS REST calls for reagent lots

use std::sync::LazyLock;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};
use ureq::Agent;

use super::queue::{LotResult, PendingLot};
use crate::config::LimsConfig;
use crate::utils::html::escape;

const SUBMIT_TIMEOUT_SECS: u64 = 30;
const CHECK_TIMEOUT_SECS: u64 = 10;

static LIMSID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"limsid="([^"]+)""#).expect("valid regex"));
static MESSAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<message>([^<]+)</message>").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub message: String,
}

fn agent(timeout_secs: u64) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Blocking client; call it from `spawn_blocking`
#[derive(Clone)]
pub struct LimsClient {
    base_url: String,
    auth_header: String,
    submit_agent: Agent,
    check_agent: Agent,
}

impl LimsClient {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        let credentials = STANDARD.encode(format!("{}:{}", username, password));
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {}", credentials),
            submit_agent: agent(SUBMIT_TIMEOUT_SECS),
            check_agent: agent(CHECK_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &LimsConfig) -> Self {
        Self::new(&config.api_url, &config.username, &config.password)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `reagent-lot` document for `POST /reagentlots`
    pub fn lot_xml(&self, lot: &PendingLot, notes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<lot:reagent-lot xmlns:lot="http://genologics.com/ri/reagentlot">
    <reagent-kit uri="{kit}"/>
    <name>{name}</name>
    <lot-number>{lot_number}</lot-number>
    <expiry-date>{expiry}</expiry-date>
    <storage-location></storage-location>
    <notes>{notes}</notes>
    <status>ACTIVE</status>
</lot:reagent-lot>"#,
            kit = escape(&lot.reagent_type.kit_uri(&self.base_url)),
            name = escape(&lot.internal_name),
            lot_number = escape(&lot.lot_number),
            expiry = lot.expiry_date.format("%Y-%m-%d"),
            notes = escape(notes),
        )
    }

    pub fn create_reagent_lot(&self, lot: &PendingLot, notes: &str) -> LotResult {
        let url = format!("{}/reagentlots", self.base_url);
        let body = self.lot_xml(lot, notes);
        debug!("Creating reagent lot {} ({})", lot.internal_name, lot.lot_number);

        let response = self
            .submit_agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/xml")
            .header("Accept", "application/xml")
            .send(body.as_bytes());

        let (status, text) = match response {
            Ok(mut resp) => {
                let status = resp.status().as_u16();
                let text = resp.body_mut().read_to_string().unwrap_or_default();
                (status, text)
            }
            Err(e) => {
                warn!("Reagent lot request failed: {}", e);
                return LotResult {
                    name: lot.internal_name.clone(),
                    success: false,
                    lims_id: None,
                    message: format!("Connection error: {}", e),
                };
            }
        };

        lot_result(&lot.internal_name, status, &text)
    }

    /// Create lots one after another
    pub fn submit_all(&self, lots: &[PendingLot], notes: &str) -> Vec<LotResult> {
        lots.iter()
            .map(|lot| self.create_reagent_lot(lot, notes))
            .collect()
    }

    pub fn test_connection(&self) -> ConnectionStatus {
        let url = format!("{}/reagentkits", self.base_url);
        let response = self
            .check_agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/xml")
            .call();

        match response {
            Ok(resp) if resp.status().as_u16() == 200 => ConnectionStatus {
                connected: true,
                message: "Connection successful".to_string(),
            },
            Ok(mut resp) => {
                let status = resp.status().as_u16();
                let text = resp.body_mut().read_to_string().unwrap_or_default();
                ConnectionStatus {
                    connected: false,
                    message: format!("HTTP {}: {}", status, truncate(&text, 100)),
                }
            }
            Err(e) => ConnectionStatus {
                connected: false,
                message: format!("Connection failed: {}", e),
            },
        }
    }
}

/// Interpret the response to a lot creation
pub fn lot_result(name: &str, status: u16, body: &str) -> LotResult {
    if status == 200 || status == 201 {
        let lims_id = LIMSID_RE
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        return LotResult {
            name: name.to_string(),
            success: true,
            lims_id: Some(lims_id),
            message: "Created successfully".to_string(),
        };
    }

    let detail = MESSAGE_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| truncate(body, 200));
    LotResult {
        name: name.to_string(),
        success: false,
        lims_id: None,
        message: format!("API error ({}): {}", status, detail),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
