use crate::helpers::{
    CLIENT_ID, CLIENT_SECRET, FILE_NAME, LIBRARY, ONE_MIB, SITE_HOSTNAME, SITE_PATH, TENANT_ID,
    client, mount_chunks, mount_session, mount_site, mount_token, requests_with_method,
    session_path, site_lookup_path, token_path, write_source,
};

use upload_core::pipeline::run_with_client;
use upload_core::{FailureKind, UploadConfig, run};

use std::collections::HashMap;
use std::path::Path;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, file_path: &Path) -> UploadConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("CLIENT_ID", CLIENT_ID.to_string()),
        ("CLIENT_SECRET", CLIENT_SECRET.to_string()),
        ("TENANT_ID", TENANT_ID.to_string()),
        ("HOSTNAME", SITE_HOSTNAME.to_string()),
        ("SITE_PATH", SITE_PATH.to_string()),
        ("DOCUMENT_LIBRARY", LIBRARY.to_string()),
        ("UPLOAD_FILE_PATH", file_path.display().to_string()),
        ("AUTHORITY_URL", server.uri()),
        ("GRAPH_URL", format!("{}/v1.0", server.uri())),
        ("HTTP_TIMEOUT", "30s".to_string()),
    ]);
    UploadConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

// ============================================================================
// Stage ordering: token -> site id -> session -> chunks, stop on first failure
// ============================================================================

/// **VALUE**: Verifies the full pipeline threads the token and site id forward.
///
/// **WHY THIS MATTERS**: The lookup and session calls must carry the exact token the
/// provider issued, and the session must be addressed by the resolved site id.
///
/// **BUG THIS CATCHES**: Would catch a stale or hard-coded token, or the hostname being
/// used where the site id belongs.
#[tokio::test]
async fn given_cooperative_services_when_run_then_uploads_file() {
    // GIVEN: Token T1, a known site, and an upload service
    let (_dir, file_path) = write_source(ONE_MIB);
    let server = MockServer::start().await;
    mount_token(&server, "T1").await;
    Mock::given(method("GET"))
        .and(path(site_lookup_path()))
        .and(header("authorization", "Bearer T1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": crate::helpers::SITE_ID })),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_session(&server).await;
    mount_chunks(&server, ONE_MIB).await;

    // WHEN: Running the pipeline from configuration
    let report = run(&config_for(&server, &file_path)).await.unwrap();

    // THEN: The file went up in four chunks through the resolved session
    assert_eq!(report.file_name, FILE_NAME);
    assert_eq!(report.bytes_sent, ONE_MIB as u64);
    assert_eq!(report.chunks_sent, 4);

    let posts = requests_with_method(&server, "POST").await;
    let session_request = posts
        .iter()
        .find(|r| r.url.path() == session_path())
        .expect("session should be created");
    assert_eq!(
        session_request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer T1")
    );
}

/// **VALUE**: Verifies a token failure stops the pipeline before any Graph call.
///
/// **WHY THIS MATTERS**: Later stages without a token would only add noise: 401s that
/// hide the real credential problem.
///
/// **BUG THIS CATCHES**: Would catch stages running despite an earlier error.
#[tokio::test]
async fn given_token_rejected_when_run_then_lookup_and_upload_never_contacted() {
    // GIVEN: A provider answering 401, and Graph endpoints that must stay untouched
    let (_dir, file_path) = write_source(10);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    // WHEN: Running the pipeline
    let config = config_for(&server, &file_path);
    let err = run_with_client(&client(&server), &config)
        .await
        .unwrap_err();

    // THEN: Auth failure; only the token endpoint saw traffic
    assert_eq!(err.kind(), FailureKind::Auth);
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), token_path());
}

/// **VALUE**: Verifies a lookup failure stops the pipeline before the upload stage.
///
/// **WHY THIS MATTERS**: Without a site id the session URL cannot be built correctly.
///
/// **BUG THIS CATCHES**: Would catch the uploader being invoked with an empty site id.
#[tokio::test]
async fn given_lookup_rejected_when_run_then_session_and_chunks_never_contacted() {
    // GIVEN: A valid token and a lookup answering 403
    let (_dir, file_path) = write_source(10);
    let server = MockServer::start().await;
    mount_token(&server, "T1").await;
    Mock::given(method("GET"))
        .and(path(site_lookup_path()))
        .respond_with(ResponseTemplate::new(403).set_body_string("accessDenied"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(session_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    // WHEN: Running the pipeline
    let err = run(&config_for(&server, &file_path)).await.unwrap_err();

    // THEN: Lookup failure with the body surfaced
    assert_eq!(err.kind(), FailureKind::Lookup);
    assert!(err.to_string().contains("accessDenied"));
    assert!(requests_with_method(&server, "PUT").await.is_empty());
}

/// **VALUE**: Verifies a missing local file surfaces as an I/O failure after lookup.
///
/// **WHY THIS MATTERS**: The local file is checked before the session is opened, so a
/// typo in the path never leaves a dangling session behind.
///
/// **BUG THIS CATCHES**: Would catch the session being created before the file is checked.
#[tokio::test]
async fn given_missing_file_when_run_then_fails_with_io_before_session() {
    let server = MockServer::start().await;
    mount_token(&server, "T1").await;
    mount_site(&server).await;
    Mock::given(method("POST"))
        .and(path(session_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = run(&config_for(&server, Path::new("/definitely/not/here/report.bin")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Io);
}
