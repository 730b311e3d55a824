// Unit tests for configuration loading
// Driven through `from_lookup` so the process environment is never touched

use crate::config::{DotEnvFile, UploadConfig};
use crate::error::config::ConfigError;
use crate::upload::ConflictBehavior;
use crate::{CHUNK_SIZE, DEFAULT_FILE_PATH, DEFAULT_TOKEN_SCOPE};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn required_vars() -> HashMap<&'static str, String> {
    HashMap::from([
        ("CLIENT_ID", "client-1".to_string()),
        ("CLIENT_SECRET", "secret-1".to_string()),
        ("TENANT_ID", "tenant-1".to_string()),
        ("HOSTNAME", "contoso.sharepoint.com".to_string()),
        ("SITE_PATH", "sites/team".to_string()),
        ("DOCUMENT_LIBRARY", "Shared Documents".to_string()),
    ])
}

fn load(vars: &HashMap<&'static str, String>) -> Result<UploadConfig, ConfigError> {
    UploadConfig::from_lookup(|name| vars.get(name).cloned())
}

fn write_dotenv(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join(".env");
    std::fs::write(&path, contents).unwrap();
    path
}

/// **VALUE**: Verifies that the six required settings are enough and defaults fill the rest.
///
/// **WHY THIS MATTERS**: A minimal deployment only sets these six variables and
/// uploads `file.txt`; that setup must keep working unchanged.
///
/// **BUG THIS CATCHES**: Would catch an optional setting accidentally made required,
/// or a changed default file path.
#[test]
fn given_required_vars_when_loaded_then_defaults_apply() {
    // GIVEN: Only the required variables
    let vars = required_vars();

    // WHEN: Loading config
    let config = load(&vars).unwrap();

    // THEN: Values are read and defaults fill the rest
    assert_eq!(config.credentials.client_id, "client-1");
    assert_eq!(config.credentials.client_secret.as_str(), "secret-1");
    assert_eq!(config.credentials.tenant_id, "tenant-1");
    assert_eq!(config.hostname, "contoso.sharepoint.com");
    assert_eq!(config.site_path, "sites/team");
    assert_eq!(config.document_library, "Shared Documents");
    assert_eq!(config.file_path, PathBuf::from(DEFAULT_FILE_PATH));
    assert_eq!(config.options.chunk_size(), CHUNK_SIZE);
    assert_eq!(config.options.conflict_behavior(), None);
    assert_eq!(config.endpoints.scope(), DEFAULT_TOKEN_SCOPE);
    assert_eq!(config.request_timeout, None);
    assert!(!config.trace_token, "Token trace must be off by default");
}

/// **VALUE**: Verifies that a missing required variable names the variable.
///
/// **WHY THIS MATTERS**: Sending empty strings fails later with
/// an opaque 400 from the token endpoint. Failing early with the name saves a round trip.
///
/// **BUG THIS CATCHES**: Would catch required values defaulting to empty strings.
#[test]
fn given_missing_tenant_when_loaded_then_returns_missing_error() {
    // GIVEN: Everything but TENANT_ID
    let mut vars = required_vars();
    vars.remove("TENANT_ID");

    // WHEN: Loading config
    let result = load(&vars);

    // THEN: Missing error naming TENANT_ID
    match result {
        Err(ConfigError::Missing { name, .. }) => assert_eq!(name, "TENANT_ID"),
        other => panic!("Expected Missing error, got {other:?}"),
    }
}

/// **VALUE**: Verifies that blank values count as missing.
///
/// **WHY THIS MATTERS**: `.env` templates often ship `CLIENT_SECRET=` lines.
///
/// **BUG THIS CATCHES**: Would catch whitespace-only values passing as configured.
#[test]
fn given_blank_secret_when_loaded_then_returns_missing_error() {
    // GIVEN: A whitespace-only secret
    let mut vars = required_vars();
    vars.insert("CLIENT_SECRET", "   ".to_string());

    // WHEN / THEN: Treated as missing
    assert!(matches!(
        load(&vars),
        Err(ConfigError::Missing {
            name: "CLIENT_SECRET",
            ..
        })
    ));
}

/// **VALUE**: Verifies every optional setting is parsed.
///
/// **WHY THIS MATTERS**: Endpoint overrides are how tests and sovereign clouds point the
/// client elsewhere; the other options change what goes on the wire.
///
/// **BUG THIS CATCHES**: Would catch an option read under the wrong name.
#[test]
fn given_optional_vars_when_loaded_then_overrides_apply() {
    // GIVEN: Every optional variable set
    let mut vars = required_vars();
    vars.insert("UPLOAD_FILE_PATH", "/tmp/report.csv".to_string());
    vars.insert("AUTHORITY_URL", "http://127.0.0.1:9000".to_string());
    vars.insert("GRAPH_URL", "http://127.0.0.1:9001/v1.0".to_string());
    vars.insert("TOKEN_SCOPE", "api://custom/.default".to_string());
    vars.insert("UPLOAD_CHUNK_SIZE", (4 * CHUNK_SIZE).to_string());
    vars.insert("HTTP_TIMEOUT", "90s".to_string());
    vars.insert("CONFLICT_BEHAVIOR", "Replace".to_string());
    vars.insert("TRACE_TOKEN", "yes".to_string());

    // WHEN: Loading config
    let config = load(&vars).unwrap();

    // THEN: Overrides are visible
    assert_eq!(config.file_path, PathBuf::from("/tmp/report.csv"));
    assert_eq!(
        config.endpoints.token_url("tenant-1").as_str(),
        "http://127.0.0.1:9000/tenant-1/oauth2/v2.0/token"
    );
    assert_eq!(config.endpoints.scope(), "api://custom/.default");
    assert_eq!(config.options.chunk_size(), 4 * CHUNK_SIZE);
    assert_eq!(
        config.options.conflict_behavior(),
        Some(ConflictBehavior::Replace)
    );
    assert_eq!(config.request_timeout, Some(Duration::from_secs(90)));
    assert!(config.trace_token);
}

/// **VALUE**: Verifies that chunk sizes the service would reject are refused at load.
///
/// **WHY THIS MATTERS**: Windows that are not multiples of 320 KiB are rejected by the
/// service mid-upload, after the session has already been opened.
///
/// **BUG THIS CATCHES**: Would catch missing multiple-of validation.
#[test]
fn given_unaligned_chunk_size_when_loaded_then_returns_invalid_error() {
    for raw in ["1000", "0", "abc"] {
        // GIVEN: An unusable chunk size
        let mut vars = required_vars();
        vars.insert("UPLOAD_CHUNK_SIZE", raw.to_string());

        // WHEN / THEN: Invalid error naming the variable
        assert!(
            matches!(
                load(&vars),
                Err(ConfigError::Invalid {
                    name: "UPLOAD_CHUNK_SIZE",
                    ..
                })
            ),
            "'{raw}' should be rejected"
        );
    }
}

#[test]
fn given_unknown_conflict_behavior_when_loaded_then_returns_invalid_error() {
    let mut vars = required_vars();
    vars.insert("CONFLICT_BEHAVIOR", "overwrite".to_string());

    assert!(matches!(
        load(&vars),
        Err(ConfigError::Invalid {
            name: "CONFLICT_BEHAVIOR",
            ..
        })
    ));
}

#[test]
fn given_bad_timeout_when_loaded_then_returns_invalid_error() {
    for raw in ["soon", "0s"] {
        let mut vars = required_vars();
        vars.insert("HTTP_TIMEOUT", raw.to_string());

        assert!(
            matches!(
                load(&vars),
                Err(ConfigError::Invalid {
                    name: "HTTP_TIMEOUT",
                    ..
                })
            ),
            "'{raw}' should be rejected"
        );
    }
}

#[test]
fn given_bad_trace_flag_when_loaded_then_returns_invalid_error() {
    let mut vars = required_vars();
    vars.insert("TRACE_TOKEN", "maybe".to_string());

    assert!(matches!(
        load(&vars),
        Err(ConfigError::Invalid {
            name: "TRACE_TOKEN",
            ..
        })
    ));
}

/// **VALUE**: Verifies that endpoint overrides must be usable base URLs.
///
/// **WHY THIS MATTERS**: A typo like `graph.microsoft.com` (no scheme) would otherwise
/// surface as a confusing transport error on the first request.
///
/// **BUG THIS CATCHES**: Would catch missing URL validation at load time.
#[test]
fn given_non_http_graph_url_when_loaded_then_returns_invalid_error() {
    for raw in ["graph.microsoft.com", "mailto:ops@example.com", "ftp://example.com"] {
        let mut vars = required_vars();
        vars.insert("GRAPH_URL", raw.to_string());

        assert!(
            matches!(
                load(&vars),
                Err(ConfigError::Invalid {
                    name: "GRAPH_URL",
                    ..
                })
            ),
            "'{raw}' should be rejected"
        );
    }
}

/// **VALUE**: Verifies that the loaded config never prints the client secret.
///
/// **WHY THIS MATTERS**: Config is logged with `{:?}` when debugging startup problems.
///
/// **BUG THIS CATCHES**: Would catch the secret field losing its redacting wrapper.
#[test]
fn given_loaded_config_when_debug_formatted_then_secret_is_hidden() {
    let config = load(&required_vars()).unwrap();

    let debug = format!("{config:?}");

    assert!(!debug.contains("secret-1"));
    assert!(debug.contains("client-1"));
}

/// **VALUE**: Verifies that a `.env` value wins over an inherited process variable.
///
/// **WHY THIS MATTERS**: Containers export `HOSTNAME` as the container id. If that shadowed
/// the `.env` value, the site lookup would go to a host that does not exist and fail with
/// an unhelpful 4xx.
///
/// **BUG THIS CATCHES**: Would catch the process environment taking precedence over the file.
#[test]
fn given_dotenv_and_inherited_hostname_when_loaded_then_dotenv_value_wins() {
    // GIVEN: A .env with the SharePoint host, and a process HOSTNAME set to a container id
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_dotenv(
        temp_dir.path(),
        "HOSTNAME=contoso.sharepoint.com\nSITE_PATH=sites/team\n",
    );
    let dotenv = DotEnvFile::read(&path).unwrap();

    let mut process = required_vars();
    process.insert("HOSTNAME", "3f2a9c1d7e0b".to_string());
    process.insert("SITE_PATH", "sites/other".to_string());

    // WHEN: Loading with the file layered over the process environment
    let config =
        UploadConfig::from_sources(Some(&dotenv), |name| process.get(name).cloned()).unwrap();

    // THEN: The file's values are used
    assert_eq!(config.hostname, "contoso.sharepoint.com");
    assert_eq!(config.site_path, "sites/team");
}

/// **VALUE**: Verifies that variables absent or blank in `.env` still come from the process.
///
/// **WHY THIS MATTERS**: Secrets are often injected by the environment while the rest
/// lives in the file.
///
/// **BUG THIS CATCHES**: Would catch the file replacing the environment wholesale, or a
/// blank file entry hiding a real process value.
#[test]
fn given_dotenv_without_secret_when_loaded_then_process_value_is_used() {
    // GIVEN: A .env that leaves CLIENT_SECRET blank
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_dotenv(temp_dir.path(), "CLIENT_SECRET=\nTENANT_ID=tenant-file\n");
    let dotenv = DotEnvFile::read(&path).unwrap();
    let process = required_vars();

    // WHEN: Loading
    let config =
        UploadConfig::from_sources(Some(&dotenv), |name| process.get(name).cloned()).unwrap();

    // THEN: Blank file entry falls through, set file entry wins
    assert_eq!(config.credentials.client_secret.as_str(), "secret-1");
    assert_eq!(config.credentials.tenant_id, "tenant-file");
    assert_eq!(dotenv.path(), path.as_path());
}

#[test]
fn given_no_dotenv_when_loaded_then_process_values_are_used() {
    let process = required_vars();

    let config = UploadConfig::from_sources(None, |name| process.get(name).cloned()).unwrap();

    assert_eq!(config.hostname, "contoso.sharepoint.com");
}

/// **VALUE**: Verifies that a malformed `.env` is a config error naming the file.
///
/// **WHY THIS MATTERS**: Silently skipping a broken file would fall back to whatever the
/// environment holds, which is the failure mode the file exists to prevent.
///
/// **BUG THIS CATCHES**: Would catch parse errors being swallowed.
#[test]
fn given_malformed_dotenv_when_read_then_returns_dotenv_error() {
    // GIVEN: An unterminated quote
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_dotenv(temp_dir.path(), "CLIENT_ID=\"unterminated\n");

    // WHEN: Reading the file
    let result = DotEnvFile::read(&path);

    // THEN: DotEnv error mentioning the path
    let Err(ConfigError::DotEnv { reason, .. }) = result else {
        panic!("expected a .env parse error");
    };
    assert!(reason.contains(".env"));
}

#[test]
fn given_dotenv_with_secret_when_debug_printed_then_value_is_hidden() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_dotenv(temp_dir.path(), "CLIENT_SECRET=super-secret-value\n");

    let dotenv = DotEnvFile::read(&path).unwrap();

    let debug = format!("{dotenv:?}");
    assert!(debug.contains("CLIENT_SECRET"));
    assert!(!debug.contains("super-secret-value"));
}
