//! Classify HTTP statuses and pipeline errors into `ErrorClass`.

use crate::error::ClientError;
use crate::retry::policy::ErrorClass;

/// Classify an HTTP status code. Returns `None` for statuses that carry no
/// special meaning to the pipeline.
pub fn classify_status(code: u32) -> Option<ErrorClass> {
    match code {
        404 => Some(ErrorClass::NotFound),
        501 => Some(ErrorClass::NotImplemented),
        401 | 403 => Some(ErrorClass::AuthRequired),
        _ => None,
    }
}

/// Classify an error message when no status code is available.
///
/// "not found" is checked first: a wrapped 404 must never be retried.
pub fn classify_message(msg: &str) -> ErrorClass {
    let msg = msg.to_ascii_lowercase();
    if msg.contains("not found") {
        return ErrorClass::NotFound;
    }
    if msg.contains("not implemented") {
        return ErrorClass::NotImplemented;
    }
    ErrorClass::Transient
}

/// Classify a pipeline error. A carried status code wins over the message.
///
/// With a status outside the table only "not found" is read from the text;
/// fallback is driven by an actual 501, never by alert wording.
pub fn classify(err: &ClientError) -> ErrorClass {
    match err.status() {
        Some(code) => classify_status(code).unwrap_or_else(|| {
            match classify_message(&err.to_string()) {
                ErrorClass::NotFound => ErrorClass::NotFound,
                _ => ErrorClass::Transient,
            }
        }),
        None => classify_message(&err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u32, reason: &str, alerts: &str) -> ClientError {
        ClientError::Http {
            method: "GET".into(),
            path: "/api/4.0/servers".into(),
            status,
            reason: reason.into(),
            remote_addr: None,
            alerts: alerts.into(),
        }
    }

    #[test]
    fn status_codes() {
        assert_eq!(classify_status(404), Some(ErrorClass::NotFound));
        assert_eq!(classify_status(501), Some(ErrorClass::NotImplemented));
        assert_eq!(classify_status(401), Some(ErrorClass::AuthRequired));
        assert_eq!(classify_status(403), Some(ErrorClass::AuthRequired));
        assert_eq!(classify_status(500), None);
        assert_eq!(classify_status(429), None);
    }

    #[test]
    fn status_wins_over_message() {
        // A 501 whose alert happens to say "not found" still drives fallback.
        let err = http(501, "Not Implemented", "route not found");
        assert_eq!(classify(&err), ErrorClass::NotImplemented);
        assert_eq!(classify(&http(401, "Unauthorized", "")), ErrorClass::AuthRequired);
    }

    #[test]
    fn message_fallback_checks_not_found_first() {
        assert_eq!(
            classify_message("Resource NOT FOUND, also not implemented"),
            ErrorClass::NotFound
        );
        assert_eq!(
            classify_message("server says: Not Implemented"),
            ErrorClass::NotImplemented
        );
        assert_eq!(classify_message("connection reset by peer"), ErrorClass::Transient);
    }

    #[test]
    fn other_statuses_fall_back_to_message() {
        let err = http(400, "Bad Request", "cdn not found");
        assert_eq!(classify(&err), ErrorClass::NotFound);
        assert_eq!(classify(&http(503, "Service Unavailable", "")), ErrorClass::Transient);
    }

    #[test]
    fn not_implemented_text_needs_a_501() {
        let err = http(500, "Internal Server Error", "feature not implemented for this cdn");
        assert_eq!(classify(&err), ErrorClass::Transient);
        assert_eq!(classify(&err.context("get servers")), ErrorClass::Transient);
        let err = ClientError::Fetch("endpoint not implemented".into());
        assert_eq!(classify(&err), ErrorClass::NotImplemented);
    }

    #[test]
    fn wrapped_errors_keep_their_class() {
        let err = http(404, "Not Found", "").context("get server 7");
        assert_eq!(classify(&err), ErrorClass::NotFound);
        let err = ClientError::Fetch("profile not found".into()).context("get profile");
        assert_eq!(classify(&err), ErrorClass::NotFound);
    }
}
