use crate::helpers::{
    FILE_NAME, LIBRARY, ONE_MIB, UPLOAD_PATH, client, header_value, mount_chunks, mount_session,
    requests_with_method, session_path, site_id, token, upload_url, write_source,
};

use upload_core::error::UploadError;
use upload_core::upload::ConflictBehavior;
use upload_core::{CHUNK_SIZE, FailureKind, UploadOptions};

use std::path::Path;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Chunked upload against a fake upload-session service
// ============================================================================

/// **VALUE**: Verifies the 1 MiB scenario end to end: four PUTs with exact framing.
///
/// **WHY THIS MATTERS**: This is the core of the tool. Every window must carry the right
/// Content-Range and Content-Length, and the bytes must be the file's bytes in order.
///
/// **BUG THIS CATCHES**: Would catch wrong range arithmetic, a padded last window,
/// bytes sent out of order, or a bearer token leaking onto the pre-authenticated URL.
#[tokio::test]
async fn given_one_mib_file_when_uploaded_then_sends_four_framed_chunks() {
    // GIVEN: A 1 MiB file and a cooperative service
    let (_dir, file_path) = write_source(ONE_MIB);
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_chunks(&server, ONE_MIB).await;

    // WHEN: Uploading
    let report = client(&server)
        .upload(
            &token(),
            &site_id(),
            LIBRARY,
            &file_path,
            &UploadOptions::default(),
        )
        .await
        .unwrap();

    // THEN: Four PUTs with the documented ranges and lengths
    let puts = requests_with_method(&server, "PUT").await;
    let ranges: Vec<String> = puts
        .iter()
        .map(|r| header_value(r, "content-range").unwrap())
        .collect();
    assert_eq!(
        ranges,
        vec![
            "bytes 0-327679/1048576",
            "bytes 327680-655359/1048576",
            "bytes 655360-983039/1048576",
            "bytes 983040-1048575/1048576",
        ]
    );
    let lengths: Vec<String> = puts
        .iter()
        .map(|r| header_value(r, "content-length").unwrap())
        .collect();
    assert_eq!(lengths, vec!["327680", "327680", "327680", "65536"]);

    // AND: The bodies reassemble the file, and no bearer token is sent to the session URL
    let sent: Vec<u8> = puts.iter().flat_map(|r| r.body.clone()).collect();
    assert_eq!(sent, std::fs::read(&file_path).unwrap());
    assert!(puts.iter().all(|r| header_value(r, "authorization").is_none()));

    // AND: The report reflects the upload
    assert_eq!(report.file_name, FILE_NAME);
    assert_eq!(report.bytes_sent, ONE_MIB as u64);
    assert_eq!(report.chunks_sent, 4);
    let item = report.item.expect("final response should decode as a drive item");
    assert_eq!(item.id.as_deref(), Some("item-1"));
}

/// **VALUE**: Verifies an exact multiple of the chunk size sends no trailing empty chunk.
///
/// **WHY THIS MATTERS**: An empty PUT would carry an impossible range and be rejected
/// after the whole file was already uploaded.
///
/// **BUG THIS CATCHES**: Would catch loops that stop on a short read instead of a
/// zero-byte read and then send one more request.
#[tokio::test]
async fn given_exact_multiple_file_when_uploaded_then_last_chunk_is_full() {
    let size = 2 * CHUNK_SIZE;
    let (_dir, file_path) = write_source(size);
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_chunks(&server, size).await;

    let report = client(&server)
        .upload(&token(), &site_id(), LIBRARY, &file_path, &UploadOptions::default())
        .await
        .unwrap();

    let puts = requests_with_method(&server, "PUT").await;
    assert_eq!(puts.len(), 2);
    assert_eq!(
        header_value(&puts[1], "content-range").as_deref(),
        Some("bytes 327680-655359/655360")
    );
    assert_eq!(report.chunks_sent, 2);
}

/// **VALUE**: Verifies a failed session creation sends no chunk at all.
///
/// **WHY THIS MATTERS**: Without a session URL there is nowhere valid to send bytes, and
/// there is no single-request fallback.
///
/// **BUG THIS CATCHES**: Would catch the chunk loop starting before the session status
/// is checked.
#[tokio::test]
async fn given_session_error_when_uploaded_then_no_chunk_is_sent() {
    // GIVEN: A session endpoint answering 500
    let (_dir, file_path) = write_source(ONE_MIB);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(session_path()))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    // WHEN: Uploading
    let err = client(&server)
        .upload(&token(), &site_id(), LIBRARY, &file_path, &UploadOptions::default())
        .await
        .unwrap_err();

    // THEN: Session error, no PUT issued
    assert!(matches!(err, UploadError::SessionRejected { .. }), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Session);
    assert_eq!(err.status_code(), Some(500));
    assert!(requests_with_method(&server, "PUT").await.is_empty());
}

/// **VALUE**: Verifies a rejected chunk stops the upload immediately.
///
/// **WHY THIS MATTERS**: Later windows would land after a gap; the service rejects them
/// and the extra traffic only hides the original failure.
///
/// **BUG THIS CATCHES**: Would catch loops that log and continue on a bad status.
#[tokio::test]
async fn given_second_chunk_rejected_when_uploaded_then_remaining_chunks_are_not_sent() {
    // GIVEN: A service that rejects the second window
    let (_dir, file_path) = write_source(ONE_MIB);
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("PUT"))
        .and(path(UPLOAD_PATH))
        .and(header("content-range", "bytes 327680-655359/1048576"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    // WHEN: Uploading
    let err = client(&server)
        .upload(&token(), &site_id(), LIBRARY, &file_path, &UploadOptions::default())
        .await
        .unwrap_err();

    // THEN: Chunk error naming the failed range, and only two PUTs were made
    match &err {
        UploadError::ChunkRejected { range, status_code, .. } => {
            assert_eq!(range, "bytes 327680-655359/1048576");
            assert_eq!(status_code.0, 500);
        }
        other => panic!("Expected ChunkRejected, got {other:?}"),
    }
    assert_eq!(err.kind(), FailureKind::Chunk);
    assert_eq!(requests_with_method(&server, "PUT").await.len(), 2);
}

/// **VALUE**: Verifies statuses outside {200, 202} are rejections even when 2xx.
///
/// **WHY THIS MATTERS**: Only those two statuses mean the window was accepted into the session.
///
/// **BUG THIS CATCHES**: Would catch `is_success()` being used for the chunk check.
#[tokio::test]
async fn given_chunk_answered_with_204_when_uploaded_then_returns_chunk_error() {
    let (_dir, file_path) = write_source(10);
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("PUT"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .upload(&token(), &site_id(), LIBRARY, &file_path, &UploadOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Chunk);
    assert_eq!(err.status_code(), Some(204));
}

/// **VALUE**: Verifies empty files are rejected before any request.
///
/// **WHY THIS MATTERS**: A zero-byte upload cannot be expressed as a Content-Range, and
/// an opened-but-never-fed session is left dangling on the service.
///
/// **BUG THIS CATCHES**: Would catch the emptiness check moving after session creation.
#[tokio::test]
async fn given_empty_file_when_uploaded_then_fails_without_contacting_service() {
    let (_dir, file_path) = write_source(0);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .upload(&token(), &site_id(), LIBRARY, &file_path, &UploadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::EmptyFile { .. }), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Io);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn given_missing_file_when_uploaded_then_returns_io_error_without_requests() {
    let server = MockServer::start().await;

    let err = client(&server)
        .upload(
            &token(),
            &site_id(),
            LIBRARY,
            Path::new("/definitely/not/here/report.bin"),
            &UploadOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Io { .. }), "got {err:?}");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

/// **VALUE**: Verifies a configured conflict behavior is sent in the session request.
///
/// **WHY THIS MATTERS**: Without it the service's default applies, which fails when the
/// file already exists.
///
/// **BUG THIS CATCHES**: Would catch the annotation key being misspelled.
#[tokio::test]
async fn given_conflict_behavior_when_session_created_then_body_carries_it() {
    let (_dir, file_path) = write_source(10);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(session_path()))
        .and(body_json(json!({
            "item": { "@microsoft.graph.conflictBehavior": "replace" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "uploadUrl": upload_url(&server) })),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_chunks(&server, 10).await;

    let options = UploadOptions::default().with_conflict_behavior(Some(ConflictBehavior::Replace));
    let report = client(&server)
        .upload(&token(), &site_id(), LIBRARY, &file_path, &options)
        .await
        .unwrap();

    assert_eq!(report.chunks_sent, 1);
}

#[tokio::test]
async fn given_session_without_upload_url_when_uploaded_then_returns_invalid_response() {
    let (_dir, file_path) = write_source(10);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(session_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "expirationDateTime": "x" })))
        .mount(&server)
        .await;

    let err = client(&server)
        .upload(&token(), &site_id(), LIBRARY, &file_path, &UploadOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::InvalidResponse { .. }), "got {err:?}");
    assert!(requests_with_method(&server, "PUT").await.is_empty());
}

/// **VALUE**: Verifies larger configured windows are honored.
///
/// **WHY THIS MATTERS**: Bigger windows cut request count for large files; the framing
/// must follow the configured size, not the constant.
///
/// **BUG THIS CATCHES**: Would catch the reader ignoring `UploadOptions::chunk_size`.
#[tokio::test]
async fn given_larger_chunk_size_when_uploaded_then_windows_follow_it() {
    let (_dir, file_path) = write_source(ONE_MIB);
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("PUT"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let options = UploadOptions::default()
        .with_chunk_size(2 * CHUNK_SIZE)
        .unwrap();
    client(&server)
        .upload(&token(), &site_id(), LIBRARY, &file_path, &options)
        .await
        .unwrap();

    let ranges: Vec<String> = requests_with_method(&server, "PUT")
        .await
        .iter()
        .map(|r| header_value(r, "content-range").unwrap())
        .collect();
    assert_eq!(
        ranges,
        vec!["bytes 0-655359/1048576", "bytes 655360-1048575/1048576"]
    );
}
