use actix_web::http::StatusCode;
use limsmeta::errors::{LimsError, Result};
use std::error::Error;

mod error_creation_tests {
    use super::*;

    #[test]
    fn test_constructors_pick_variants() {
        assert!(matches!(
            LimsError::pin_not_found("x"),
            LimsError::PinNotFound(_)
        ));
        assert!(matches!(
            LimsError::database_connection("x"),
            LimsError::DatabaseConnection(_)
        ));
        assert!(matches!(LimsError::lims_api("x"), LimsError::LimsApi(_)));
        assert!(matches!(LimsError::deploy_mode("x"), LimsError::DeployMode(_)));
        assert!(matches!(LimsError::git("x"), LimsError::Git(_)));
    }

    #[test]
    fn test_display_includes_type_and_message() {
        let error = LimsError::validation("Lot number is required");
        assert_eq!(
            error.to_string(),
            "Validation Error: Lot number is required"
        );
        assert_eq!(error.message(), "Lot number is required");
    }

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            LimsError::config(""),
            LimsError::pin_board(""),
            LimsError::pin_not_found(""),
            LimsError::database_connection(""),
            LimsError::database_operation(""),
            LimsError::file_operation(""),
            LimsError::validation(""),
            LimsError::not_found(""),
            LimsError::serialization(""),
            LimsError::lims_api(""),
            LimsError::deploy_mode(""),
            LimsError::git(""),
            LimsError::date_parse(""),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_colored_output_carries_code() {
        colored::control::set_override(false);
        let formatted = LimsError::git("push rejected").format_colored();
        assert!(formatted.contains("[ERROR]"));
        assert!(formatted.contains("E012"));
        assert!(formatted.contains("push rejected"));
    }
}

mod status_tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            LimsError::validation("").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LimsError::date_parse("").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LimsError::not_found("").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LimsError::lims_api("").http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            LimsError::database_connection("").http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            LimsError::git("").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

mod conversion_tests {
    use super::*;

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing data.txt");
        let error: LimsError = io.into();
        assert!(matches!(error, LimsError::FileOperation(_)));
        assert!(error.message().contains("missing data.txt"));
    }

    #[test]
    fn test_from_json_error() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(LimsError::from(json), LimsError::Serialization(_)));
    }

    #[test]
    fn test_from_chrono_error() {
        let parse = chrono::NaiveDate::parse_from_str("2024-13-01", "%Y-%m-%d").unwrap_err();
        assert!(matches!(LimsError::from(parse), LimsError::DateParse(_)));
    }

    #[test]
    fn test_question_mark_propagation() {
        fn read(path: &str) -> Result<String> {
            Ok(std::fs::read_to_string(path)?)
        }
        let error = read("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(error, LimsError::FileOperation(_)));
    }

    #[test]
    fn test_is_std_error() {
        let error = LimsError::config("bad");
        let boxed: Box<dyn Error> = Box::new(error);
        assert!(boxed.source().is_none());
        assert!(boxed.to_string().contains("Configuration Error"));
    }
}
