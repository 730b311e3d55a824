//! Process exit codes, one per failure kind.
//!
//! | code | meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | file uploaded                             |
//! | 1    | logger could not be initialized           |
//! | 2    | configuration missing or invalid          |
//! | 3    | token endpoint rejected the credentials   |
//! | 4    | site lookup failed                        |
//! | 5    | upload session could not be created       |
//! | 6    | a chunk was rejected                      |
//! | 7    | local file could not be read              |
//! | 8    | network failure before any HTTP status    |

use upload_core::{CoreError, FailureKind};

pub const SUCCESS: u8 = 0;
pub const LOGGER_FAILURE: u8 = 1;
pub const CONFIG_FAILURE: u8 = 2;
pub const AUTH_FAILURE: u8 = 3;
pub const LOOKUP_FAILURE: u8 = 4;
pub const SESSION_FAILURE: u8 = 5;
pub const CHUNK_FAILURE: u8 = 6;
pub const IO_FAILURE: u8 = 7;
pub const TRANSPORT_FAILURE: u8 = 8;

pub fn for_kind(kind: FailureKind) -> u8 {
    match kind {
        FailureKind::Config => CONFIG_FAILURE,
        FailureKind::Auth => AUTH_FAILURE,
        FailureKind::Lookup => LOOKUP_FAILURE,
        FailureKind::Session => SESSION_FAILURE,
        FailureKind::Chunk => CHUNK_FAILURE,
        FailureKind::Io => IO_FAILURE,
        FailureKind::Transport => TRANSPORT_FAILURE,
    }
}

pub fn for_error(error: &CoreError) -> u8 {
    for_kind(error.kind())
}
