//! Colored console output for the CLI commands

// Macros re-export `colored` through this module so callers need no import.
pub use colored::Colorize;

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {{
        use $crate::utils::colors::Colorize;
        eprintln!("{} {}", "Error:".bold().red(), format!($($arg)*))
    }};
}

#[macro_export]
macro_rules! print_success {
    ($($arg:tt)*) => {{
        use $crate::utils::colors::Colorize;
        println!("{} {}", "✓".bold().green(), format!($($arg)*))
    }};
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {{
        use $crate::utils::colors::Colorize;
        println!("{} {}", "ℹ".bold().blue(), format!($($arg)*))
    }};
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {{
        use $crate::utils::colors::Colorize;
        println!("{} {}", "⚠".bold().yellow(), format!($($arg)*))
    }};
}

/// `label: value` line with a dimmed label
pub fn field(label: &str, value: impl std::fmt::Display) -> String {
    format!("  {} {}", format!("{}:", label).dimmed(), value)
}
