mod r#impl;
mod structs;

pub use r#impl::{DEFAULT_CONFIG_PATH, get_config, init_config, set_config};
pub use structs::*;
