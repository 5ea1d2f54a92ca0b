//! Server-rendered HTML

pub mod layout;
pub mod reagents;
pub mod table;

pub use layout::{Alert, NavItem, render_page};
