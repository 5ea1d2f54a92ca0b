//! limsmeta - Clarity LIMS metadata browser
//!
//! Displays projects, samples and sequencing runs from a SQLite snapshot
//! published as a pin, registers reagent lots in Clarity LIMS, and carries
//! the CI steps that publish the app to its deploy branches.
//!
//! # Architecture
//! - `pins`: pin boards (Posit Connect, local folder) and the download cache
//! - `data`: database access, table shaping and the shared snapshot
//! - `brand`: brand file and generated stylesheet
//! - `reagents`: reagent lot queue and Clarity API client
//! - `deploy`: deploy mode, dependency list, manifest and git publishing
//! - `api`: HTTP pages, JSON API and middleware
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes

pub mod api;
pub mod brand;
pub mod cli;
pub mod config;
pub mod data;
pub mod deploy;
pub mod errors;
pub mod pins;
pub mod reagents;
pub mod runtime;
pub mod system;
pub mod utils;
