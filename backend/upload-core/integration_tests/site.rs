use crate::helpers::{SITE_HOSTNAME, SITE_ID, SITE_PATH, client, site_lookup_path, token};

use upload_core::error::LookupError;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Site lookup against a fake Graph API
// ============================================================================

/// **VALUE**: Verifies the lookup is addressed by `{hostname}:/{path}` and authenticated.
///
/// **WHY THIS MATTERS**: Without the bearer header the service answers 401; with the wrong
/// address form it answers 400. Both look like permission problems to the operator.
///
/// **BUG THIS CATCHES**: Would catch a missing Authorization header or a mangled path.
#[tokio::test]
async fn given_existing_site_when_resolve_site_id_called_then_returns_id() {
    // GIVEN: A lookup endpoint requiring the bearer token
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(site_lookup_path()))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": SITE_ID,
            "displayName": "Team",
        })))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Resolving the site
    let site_id = client(&server)
        .resolve_site_id(&token(), SITE_HOSTNAME, SITE_PATH)
        .await
        .unwrap();

    // THEN: The opaque id is returned untouched
    assert_eq!(site_id.as_str(), SITE_ID);
}

/// **VALUE**: Verifies lookup failures carry both status and response body.
///
/// **WHY THIS MATTERS**: The body's error code is the only thing distinguishing a typo in
/// the site path from a missing `Sites.ReadWrite.All` grant.
///
/// **BUG THIS CATCHES**: Would catch the body being discarded on failure.
#[tokio::test]
async fn given_unknown_site_when_resolve_site_id_called_then_returns_rejected_with_body() {
    // GIVEN: A 404 with a diagnostic body
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(site_lookup_path()))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "itemNotFound", "message": "Requested site could not be found" }
        })))
        .mount(&server)
        .await;

    // WHEN: Resolving the site
    let err = client(&server)
        .resolve_site_id(&token(), SITE_HOSTNAME, SITE_PATH)
        .await
        .unwrap_err();

    // THEN: Rejected with the body kept
    match err {
        LookupError::Rejected {
            status_code,
            ref status_line,
            ref body,
            ..
        } => {
            assert_eq!(status_code.0, 404);
            assert_eq!(status_line, "404 Not Found");
            assert!(body.contains("itemNotFound"));
        }
        other => panic!("Expected Rejected error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_body_without_id_when_resolve_site_id_called_then_returns_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(site_lookup_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "team" })))
        .mount(&server)
        .await;

    let err = client(&server)
        .resolve_site_id(&token(), SITE_HOSTNAME, SITE_PATH)
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::InvalidResponse { .. }), "got {err:?}");
}
