use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum LimsError {
    Config(String),
    PinBoard(String),
    PinNotFound(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    LimsApi(String),
    DeployMode(String),
    Git(String),
    DateParse(String),
}

impl LimsError {
    /// Error code, e.g. `E007`
    pub fn code(&self) -> &'static str {
        match self {
            LimsError::Config(_) => "E001",
            LimsError::PinBoard(_) => "E002",
            LimsError::PinNotFound(_) => "E003",
            LimsError::DatabaseConnection(_) => "E004",
            LimsError::DatabaseOperation(_) => "E005",
            LimsError::FileOperation(_) => "E006",
            LimsError::Validation(_) => "E007",
            LimsError::NotFound(_) => "E008",
            LimsError::Serialization(_) => "E009",
            LimsError::LimsApi(_) => "E010",
            LimsError::DeployMode(_) => "E011",
            LimsError::Git(_) => "E012",
            LimsError::DateParse(_) => "E013",
        }
    }

    /// Human readable error type
    pub fn error_type(&self) -> &'static str {
        match self {
            LimsError::Config(_) => "Configuration Error",
            LimsError::PinBoard(_) => "Pin Board Error",
            LimsError::PinNotFound(_) => "Pin Not Found",
            LimsError::DatabaseConnection(_) => "Database Connection Error",
            LimsError::DatabaseOperation(_) => "Database Operation Error",
            LimsError::FileOperation(_) => "File Operation Error",
            LimsError::Validation(_) => "Validation Error",
            LimsError::NotFound(_) => "Resource Not Found",
            LimsError::Serialization(_) => "Serialization Error",
            LimsError::LimsApi(_) => "LIMS API Error",
            LimsError::DeployMode(_) => "Deploy Mode Error",
            LimsError::Git(_) => "Git Error",
            LimsError::DateParse(_) => "Date Parse Error",
        }
    }

    /// Error detail
    pub fn message(&self) -> &str {
        match self {
            LimsError::Config(msg)
            | LimsError::PinBoard(msg)
            | LimsError::PinNotFound(msg)
            | LimsError::DatabaseConnection(msg)
            | LimsError::DatabaseOperation(msg)
            | LimsError::FileOperation(msg)
            | LimsError::Validation(msg)
            | LimsError::NotFound(msg)
            | LimsError::Serialization(msg)
            | LimsError::LimsApi(msg)
            | LimsError::DeployMode(msg)
            | LimsError::Git(msg)
            | LimsError::DateParse(msg) => msg,
        }
    }

    /// HTTP status used when the error reaches a web handler
    pub fn http_status(&self) -> StatusCode {
        match self {
            LimsError::Validation(_) | LimsError::DateParse(_) => StatusCode::BAD_REQUEST,
            LimsError::NotFound(_) | LimsError::PinNotFound(_) => StatusCode::NOT_FOUND,
            LimsError::PinBoard(_) | LimsError::LimsApi(_) => StatusCode::BAD_GATEWAY,
            LimsError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Colored output for the server log and CLI
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// Plain `Type: message` output
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LimsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LimsError {}

// Constructors
impl LimsError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        LimsError::Config(msg.into())
    }

    pub fn pin_board<T: Into<String>>(msg: T) -> Self {
        LimsError::PinBoard(msg.into())
    }

    pub fn pin_not_found<T: Into<String>>(msg: T) -> Self {
        LimsError::PinNotFound(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LimsError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LimsError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LimsError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LimsError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LimsError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LimsError::Serialization(msg.into())
    }

    pub fn lims_api<T: Into<String>>(msg: T) -> Self {
        LimsError::LimsApi(msg.into())
    }

    pub fn deploy_mode<T: Into<String>>(msg: T) -> Self {
        LimsError::DeployMode(msg.into())
    }

    pub fn git<T: Into<String>>(msg: T) -> Self {
        LimsError::Git(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LimsError::DateParse(msg.into())
    }
}

// Conversions from library errors
impl From<sea_orm::DbErr> for LimsError {
    fn from(err: sea_orm::DbErr) -> Self {
        LimsError::DatabaseOperation(err.to_string())
    }
}

impl From<sea_orm::sqlx::Error> for LimsError {
    fn from(err: sea_orm::sqlx::Error) -> Self {
        LimsError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LimsError {
    fn from(err: std::io::Error) -> Self {
        LimsError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LimsError {
    fn from(err: serde_json::Error) -> Self {
        LimsError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for LimsError {
    fn from(err: serde_yaml::Error) -> Self {
        LimsError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for LimsError {
    fn from(err: csv::Error) -> Self {
        LimsError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LimsError {
    fn from(err: chrono::ParseError) -> Self {
        LimsError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LimsError>;
