use spupload::exit_code::{
    AUTH_FAILURE, CHUNK_FAILURE, CONFIG_FAILURE, IO_FAILURE, LOGGER_FAILURE, LOOKUP_FAILURE,
    SESSION_FAILURE, SUCCESS, TRANSPORT_FAILURE, for_error, for_kind,
};

use upload_core::error::{AuthError, ConfigError, UploadError};
use upload_core::{CoreError, FailureKind};

use common::ErrorLocation;

use std::collections::HashSet;
use std::panic::Location;

use reqwest::StatusCode;

/// **VALUE**: Verifies every failure kind has its own non-zero exit code.
///
/// **WHY THIS MATTERS**: Schedulers and scripts branch on the exit status; two kinds
/// sharing a code, or a failure exiting 0, makes retries and alerts wrong.
///
/// **BUG THIS CATCHES**: Would catch a new kind mapped onto an existing code, or onto 0.
#[test]
fn given_all_failure_kinds_when_mapped_then_codes_are_distinct_and_non_zero() {
    let kinds = [
        FailureKind::Config,
        FailureKind::Auth,
        FailureKind::Lookup,
        FailureKind::Session,
        FailureKind::Chunk,
        FailureKind::Io,
        FailureKind::Transport,
    ];

    let codes: HashSet<u8> = kinds.iter().map(|k| for_kind(*k)).collect();

    assert_eq!(codes.len(), kinds.len(), "Exit codes must be distinct");
    assert!(!codes.contains(&SUCCESS));
    assert!(!codes.contains(&LOGGER_FAILURE));
}

#[test]
fn given_documented_kinds_when_mapped_then_match_table() {
    assert_eq!(for_kind(FailureKind::Config), CONFIG_FAILURE);
    assert_eq!(for_kind(FailureKind::Auth), AUTH_FAILURE);
    assert_eq!(for_kind(FailureKind::Lookup), LOOKUP_FAILURE);
    assert_eq!(for_kind(FailureKind::Session), SESSION_FAILURE);
    assert_eq!(for_kind(FailureKind::Chunk), CHUNK_FAILURE);
    assert_eq!(for_kind(FailureKind::Io), IO_FAILURE);
    assert_eq!(for_kind(FailureKind::Transport), TRANSPORT_FAILURE);
}

/// **VALUE**: Verifies errors flowing out of the pipeline land on their stage's code.
///
/// **WHY THIS MATTERS**: The binary only sees `CoreError`; the mapping must look through
/// the wrapper to the stage that failed.
///
/// **BUG THIS CATCHES**: Would catch every upload error mapping to one code.
#[test]
fn given_core_errors_when_mapped_then_use_stage_codes() {
    let config: CoreError = ConfigError::Missing {
        location: ErrorLocation::from(Location::caller()),
        name: "CLIENT_ID",
    }
    .into();
    let auth: CoreError = AuthError::rejected(StatusCode::UNAUTHORIZED, "").into();
    let session: CoreError =
        UploadError::session_rejected(StatusCode::INTERNAL_SERVER_ERROR, "").into();
    let chunk: CoreError =
        UploadError::chunk_rejected("bytes 0-9/10", StatusCode::BAD_REQUEST, "").into();

    assert_eq!(for_error(&config), CONFIG_FAILURE);
    assert_eq!(for_error(&auth), AUTH_FAILURE);
    assert_eq!(for_error(&session), SESSION_FAILURE);
    assert_eq!(for_error(&chunk), CHUNK_FAILURE);
}
