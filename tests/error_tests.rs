// Error handling tests
// Author: kelexine (https://github.com/kelexine)

use ms_translator::error::{AuthDecodeError, TranslatorError};
use ms_translator::http::{RawResult, TransportErrorKind};

fn http(status: u16, body: &str) -> RawResult {
    RawResult::Response {
        status,
        body: body.to_string(),
        latency_ms: 4,
    }
}

#[test]
fn test_error_display_messages() {
    let errors = vec![
        TranslatorError::Configuration("auth.subscription_key is required".to_string()),
        TranslatorError::Transport(RawResult::TransportFailure {
            kind: TransportErrorKind::Connect,
            message: "connection refused".to_string(),
            latency_ms: 2,
        }),
        TranslatorError::AuthDecode(AuthDecodeError::MissingToken),
        TranslatorError::HttpStatus(http(400, "bad request")),
        TranslatorError::validation("empty_texts", "texts array is empty."),
        TranslatorError::Persistence {
            path: "/tmp/x".to_string(),
            message: "read-only".to_string(),
        },
        TranslatorError::Decode("XML parsing error".to_string()),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error should have display message");
    }
}

#[test]
fn test_from_raw_classifies_outcomes() {
    assert!(TranslatorError::from_raw(&http(200, "ok")).is_none());

    let err = TranslatorError::from_raw(&http(503, "down")).unwrap();
    assert_eq!(err.kind(), "http_status");
    assert_eq!(err.status(), Some(503));

    let failure = RawResult::TransportFailure {
        kind: TransportErrorKind::Timeout,
        message: "operation timed out".to_string(),
        latency_ms: 10_000,
    };
    let err = TranslatorError::from_raw(&failure).unwrap();
    assert_eq!(err.kind(), "transport");
    assert_eq!(err.status(), None);
    assert!(err.to_string().contains("#28"));
}

#[test]
fn test_service_error_fields() {
    let err = TranslatorError::HttpStatus(http(
        400,
        r#"{"error":"invalid_client","error_description":"ACS50012: Authentication failed."}"#,
    ));
    assert_eq!(err.service_error().as_deref(), Some("invalid_client"));
    assert_eq!(
        err.service_error_description().as_deref(),
        Some("ACS50012: Authentication failed.")
    );

    let err = TranslatorError::HttpStatus(http(500, "<html>oops</html>"));
    assert_eq!(err.service_error(), None);
}

#[test]
fn test_auth_decode_errors_are_distinct() {
    let missing = TranslatorError::from(AuthDecodeError::MissingToken);
    let not_string = TranslatorError::from(AuthDecodeError::TokenNotString);

    assert_eq!(missing.kind(), "auth_decode");
    assert_ne!(missing.to_string(), not_string.to_string());
    assert!(missing.to_string().contains("Access token not found in response"));
}

#[test]
fn test_validation_error() {
    let error = TranslatorError::validation("empty_language_codes", "languageCodes array is empty.");
    assert!(format!("{}", error).contains("empty_language_codes"));
    assert!(error.raw_result().is_none());
}
