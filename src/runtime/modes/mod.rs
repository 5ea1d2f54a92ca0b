//! Mode routing
//!
//! `serve` (the default) runs the HTTP server; every other command runs
//! once and exits.

pub mod cli;
pub mod server;

pub use cli::run_cli;
pub use server::run_server;
