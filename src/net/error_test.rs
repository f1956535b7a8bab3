use super::*;

#[test]
fn from_status_extracts_server_message() {
    let err = ApiError::from_status(422, r#"{"error":"URL is invalid"}"#);
    assert_eq!(err, ApiError::Rejected { status: 422, message: Some("URL is invalid".to_owned()) });
    assert_eq!(err.user_message("Failed to create link"), "URL is invalid");
}

#[test]
fn from_status_401_is_unauthorized() {
    let err = ApiError::from_status(401, r#"{"error":"Invalid credentials"}"#);
    assert!(err.is_unauthorized());
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.server_message(), Some("Invalid credentials"));
}

#[test]
fn non_json_body_falls_back() {
    let err = ApiError::from_status(500, "<html>Internal Server Error</html>");
    assert_eq!(err, ApiError::Rejected { status: 500, message: None });
    assert_eq!(err.user_message("Failed to fetch links"), "Failed to fetch links");
}

#[test]
fn blank_server_message_falls_back() {
    let err = ApiError::from_status(400, r#"{"error":"   "}"#);
    assert_eq!(err.user_message("Failed to update link"), "Failed to update link");
}

#[test]
fn network_errors_always_use_fallback() {
    let err = ApiError::Network("connection refused".to_owned());
    assert!(err.is_transient());
    assert_eq!(err.status(), None);
    assert_eq!(err.user_message("An error occurred during login"), "An error occurred during login");
}
