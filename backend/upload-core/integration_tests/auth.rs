use crate::helpers::{CLIENT_ID, CLIENT_SECRET, client, credentials, token_path};

use upload_core::config::Endpoints;
use upload_core::error::AuthError;
use upload_core::{FailureKind, SharePointClient};

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Credential exchange against a fake identity provider
// ============================================================================

/// **VALUE**: Verifies the client-credentials form and the token extraction.
///
/// **WHY THIS MATTERS**: The provider rejects requests with a missing grant type, the
/// wrong content type or a scope outside the target service.
///
/// **BUG THIS CATCHES**: Would catch JSON bodies sent instead of a form, or a field
/// renamed in the form.
#[tokio::test]
async fn given_valid_credentials_when_obtain_token_called_then_returns_access_token() {
    // GIVEN: A provider that only answers the exact client-credentials form
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(token_path()))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains(format!("client_id={CLIENT_ID}")))
        .and(body_string_contains(format!("client_secret={CLIENT_SECRET}")))
        .and(body_string_contains(
            "scope=https%3A%2F%2Fgraph.microsoft.com%2F.default",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "T1" })))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Obtaining a token
    let token = client(&server).obtain_token(&credentials()).await.unwrap();

    // THEN: The token from the body is returned
    assert_eq!(token.as_str(), "T1");
}

/// **VALUE**: Verifies any non-200 status is an auth rejection carrying the status line.
///
/// **WHY THIS MATTERS**: Wrong secrets and disabled apps show up only as a status from
/// the provider; the operator needs to see it.
///
/// **BUG THIS CATCHES**: Would catch `is_success()` checks that let 2xx variants through
/// or errors that drop the status.
#[tokio::test]
async fn given_rejected_credentials_when_obtain_token_called_then_returns_rejected_error() {
    for status in [401u16, 400, 201] {
        // GIVEN: A provider answering with a non-200 status
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(token_path()))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(json!({ "error": "invalid_client", "access_token": "T1" })),
            )
            .mount(&server)
            .await;

        // WHEN: Obtaining a token
        let err = client(&server)
            .obtain_token(&credentials())
            .await
            .unwrap_err();

        // THEN: Rejected with the status preserved
        assert!(
            matches!(err, AuthError::Rejected { .. }),
            "status {status}: expected Rejected, got {err:?}"
        );
        assert_eq!(err.status_code(), Some(status));
        assert_eq!(err.kind(), FailureKind::Auth);
    }
}

/// **VALUE**: Verifies a 200 without `access_token` is reported as a bad response.
///
/// **WHY THIS MATTERS**: Proxies and captive portals answer 200 with HTML; treating that
/// as a token would fail later with a confusing 401 from the lookup.
///
/// **BUG THIS CATCHES**: Would catch a defaulted or optional token field.
#[tokio::test]
async fn given_body_without_token_when_obtain_token_called_then_returns_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })))
        .mount(&server)
        .await;

    let err = client(&server)
        .obtain_token(&credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidResponse { .. }), "got {err:?}");
}

/// **VALUE**: Verifies a refused connection is a transport error, not an auth rejection.
///
/// **WHY THIS MATTERS**: "Wrong password" and "network down" need different fixes, and
/// map to different exit codes.
///
/// **BUG THIS CATCHES**: Would catch every reqwest error being folded into one variant.
#[tokio::test]
async fn given_unreachable_provider_when_obtain_token_called_then_returns_transport_error() {
    // GIVEN: An authority nobody listens on
    let endpoints = Endpoints::new("http://127.0.0.1:1", "http://127.0.0.1:1/v1.0").unwrap();
    let client = SharePointClient::new(endpoints).unwrap();

    // WHEN: Obtaining a token
    let err = client.obtain_token(&credentials()).await.unwrap_err();

    // THEN: Transport error
    match err {
        AuthError::Transport(transport) => assert!(transport.is_connection),
        other => panic!("Expected Transport error, got {other:?}"),
    }
}
