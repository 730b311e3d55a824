// Unit tests for RedactedSecret
// Secrets must never leak through formatting or serialization

use crate::RedactedSecret;

/// **VALUE**: Verifies that Debug and Display never print the secret value.
///
/// **WHY THIS MATTERS**: Credentials and bearer tokens flow through structs that get
/// logged with `{:?}`. A derived Debug would print the client secret into log files.
///
/// **BUG THIS CATCHES**: Would catch if someone replaces the manual Debug impl with
/// `#[derive(Debug)]`.
#[test]
fn given_secret_when_formatted_then_value_is_redacted() {
    // GIVEN: A secret value
    let secret = RedactedSecret::new("super-secret-value");

    // WHEN: Formatting with Debug and Display
    let debug = format!("{:?}", secret);
    let display = format!("{}", secret);

    // THEN: Neither output contains the value
    assert!(!debug.contains("super-secret-value"));
    assert!(!display.contains("super-secret-value"));
    assert!(debug.contains("REDACTED"));
}

/// **VALUE**: Verifies that serializing a secret fails instead of emitting it.
///
/// **WHY THIS MATTERS**: Config structs may be dumped to JSON for diagnostics;
/// serialization must refuse rather than write the secret out.
///
/// **BUG THIS CATCHES**: Would catch a derived or pass-through Serialize impl.
#[test]
fn given_secret_when_serialized_then_returns_error() {
    // GIVEN: A secret value
    let secret = RedactedSecret::new("token-abc");

    // WHEN: Serializing to JSON
    let result = serde_json::to_string(&secret);

    // THEN: Serialization is refused
    assert!(result.is_err(), "Secrets must not serialize");
}

/// **VALUE**: Verifies that the raw value is still available for transmission.
///
/// **WHY THIS MATTERS**: The token endpoint and the Authorization header need the
/// real value; redaction must only affect formatting.
///
/// **BUG THIS CATCHES**: Would catch if `as_str()` returned the redacted placeholder.
#[test]
fn given_secret_when_as_str_called_then_returns_raw_value() {
    // GIVEN: A secret value
    let secret = RedactedSecret::new("T1");

    // WHEN / THEN: Raw access and length reflect the real value
    assert_eq!(secret.as_str(), "T1");
    assert_eq!(secret.len(), 2);
    assert!(!secret.is_empty());
}
