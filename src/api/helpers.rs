//! JSON response helpers shared by the API handlers

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::errors::LimsError;

/// API error codes
///
/// Grouped by thousands:
/// - 0: success
/// - 1000-1099: general errors
/// - 2000-2099: data and pin errors
/// - 3000-3099: reagent errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,
    ServiceUnavailable = 1030,

    PinBoardError = 2000,
    PinNotFound = 2001,
    DatabaseError = 2002,
    CsvGenerationError = 2006,

    LimsApiError = 3000,
    ReagentValidation = 3001,
}

impl From<&LimsError> for ErrorCode {
    fn from(err: &LimsError) -> Self {
        match err {
            LimsError::Validation(_) => ErrorCode::BadRequest,
            LimsError::DateParse(_) => ErrorCode::InvalidDateFormat,
            LimsError::NotFound(_) => ErrorCode::NotFound,
            LimsError::PinBoard(_) => ErrorCode::PinBoardError,
            LimsError::PinNotFound(_) => ErrorCode::PinNotFound,
            LimsError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            LimsError::DatabaseOperation(_) => ErrorCode::DatabaseError,
            LimsError::Serialization(_) => ErrorCode::CsvGenerationError,
            LimsError::LimsApi(_) => ErrorCode::LimsApiError,
            _ => ErrorCode::InternalServerError,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// JSON response with the given status and code
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// `200 OK` with code 0
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// Error response without data
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// Map a `LimsError` to its HTTP status and error code
pub fn error_from_lims(err: &LimsError) -> HttpResponse {
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// Map a `Result` to a success or error response
pub fn api_result<T: Serialize>(result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_lims(&e),
    }
}
