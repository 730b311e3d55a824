//! Environment-based configuration.
//!
//! Values come from a `.env` file in the current directory or next to the
//! executable, falling back to the process environment. The file wins when both
//! set a variable, so inherited values such as a container's `HOSTNAME` cannot
//! shadow it. The process environment is never modified. Loading is written
//! against a lookup function so it can be driven from a map.

pub mod endpoints;

pub use endpoints::Endpoints;

use crate::auth::ClientCredentials;
use crate::error::config::ConfigError;
use crate::upload::{ConflictBehavior, UploadOptions};
use crate::{DEFAULT_AUTHORITY_URL, DEFAULT_FILE_PATH, DEFAULT_GRAPH_URL};

use common::{ErrorLocation, RedactedSecret};

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};

pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";
pub const TENANT_ID_VAR: &str = "TENANT_ID";
pub const HOSTNAME_VAR: &str = "HOSTNAME";
pub const SITE_PATH_VAR: &str = "SITE_PATH";
pub const DOCUMENT_LIBRARY_VAR: &str = "DOCUMENT_LIBRARY";
pub const FILE_PATH_VAR: &str = "UPLOAD_FILE_PATH";
pub const AUTHORITY_URL_VAR: &str = "AUTHORITY_URL";
pub const GRAPH_URL_VAR: &str = "GRAPH_URL";
pub const TOKEN_SCOPE_VAR: &str = "TOKEN_SCOPE";
pub const CHUNK_SIZE_VAR: &str = "UPLOAD_CHUNK_SIZE";
pub const HTTP_TIMEOUT_VAR: &str = "HTTP_TIMEOUT";
pub const CONFLICT_BEHAVIOR_VAR: &str = "CONFLICT_BEHAVIOR";
pub const TRACE_TOKEN_VAR: &str = "TRACE_TOKEN";

const DOTENV_FILE_NAME: &str = ".env";

/// Everything one run needs. Read once, never mutated.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub credentials: ClientCredentials,
    pub hostname: String,
    pub site_path: String,
    pub document_library: String,
    pub file_path: PathBuf,
    pub endpoints: Endpoints,
    pub options: UploadOptions,
    /// Overall per-request timeout. `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
    /// Echo the bearer token at debug level. Development only.
    pub trace_token: bool,
}

/// Variables parsed from a `.env` file. `Debug` lists names only.
#[derive(Clone)]
pub struct DotEnvFile {
    path: PathBuf,
    vars: HashMap<String, String>,
}

impl DotEnvFile {
    /// Parse `path` without exporting anything into the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DotEnv`] if the file cannot be read or a line does not parse.
    #[track_caller]
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let location = ErrorLocation::from(Location::caller());
        let dotenv_error = |e: dotenvy::Error| ConfigError::DotEnv {
            location,
            reason: format!("{}: {e}", path.display()),
        };

        let vars = dotenvy::from_path_iter(path)
            .map_err(dotenv_error)?
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(dotenv_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            vars,
        })
    }

    /// Looks for `.env` in the current directory, then in the executable's directory.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn find() -> Result<Option<Self>, ConfigError> {
        let candidates = [
            env::current_dir().ok(),
            env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
        ];

        for dir in candidates.into_iter().flatten() {
            let path = dir.join(DOTENV_FILE_NAME);
            if path.is_file() {
                let file = Self::read(&path)?;
                info!("Loaded .env from: {}", path.display());
                return Ok(Some(file));
            }
        }

        Ok(None)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blank value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

impl fmt::Debug for DotEnvFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("DotEnvFile")
            .field("path", &self.path)
            .field("names", &names)
            .finish()
    }
}

impl UploadConfig {
    /// Load from `.env`, if one is found, layered over the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a `.env` file exists but cannot be parsed,
    /// a required variable is missing or blank, or an optional one is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dotenv = DotEnvFile::find()?;
        if dotenv.is_none() {
            debug!("No .env file found - using existing environment variables");
        }

        Self::from_sources(dotenv.as_ref(), process_var)
    }

    /// Layer `dotenv` over `process`. A differing process value is reported by name only.
    pub fn from_sources<F>(dotenv: Option<&DotEnvFile>, process: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|name| {
            let Some((file, file_value)) =
                dotenv.and_then(|file| file.get(name).map(|value| (file, value)))
            else {
                return process(name);
            };

            if let Some(process_value) = process(name)
                && process_value.trim() != file_value.trim()
            {
                warn!(
                    "{name} from {} overrides a different value in the process environment",
                    file.path().display()
                );
            }
            Some(file_value.to_string())
        })
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = Source { lookup };

        let credentials = ClientCredentials {
            client_id: source.required(CLIENT_ID_VAR)?,
            client_secret: RedactedSecret::new(source.required(CLIENT_SECRET_VAR)?),
            tenant_id: source.required(TENANT_ID_VAR)?,
        };

        let mut endpoints = Endpoints::new(
            &source
                .optional(AUTHORITY_URL_VAR)
                .unwrap_or_else(|| DEFAULT_AUTHORITY_URL.to_string()),
            &source
                .optional(GRAPH_URL_VAR)
                .unwrap_or_else(|| DEFAULT_GRAPH_URL.to_string()),
        )?;
        if let Some(scope) = source.optional(TOKEN_SCOPE_VAR) {
            endpoints = endpoints.with_scope(scope);
        }

        let mut options = UploadOptions::default();
        if let Some(raw) = source.optional(CHUNK_SIZE_VAR) {
            let size = raw.parse::<usize>().map_err(|e| invalid(CHUNK_SIZE_VAR, e))?;
            options = options
                .with_chunk_size(size)
                .map_err(|e| invalid(CHUNK_SIZE_VAR, e))?;
        }
        if let Some(raw) = source.optional(CONFLICT_BEHAVIOR_VAR) {
            let behavior = raw
                .parse::<ConflictBehavior>()
                .map_err(|e| invalid(CONFLICT_BEHAVIOR_VAR, e))?;
            options = options.with_conflict_behavior(Some(behavior));
        }

        let request_timeout = match source.optional(HTTP_TIMEOUT_VAR) {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        let trace_token = match source.optional(TRACE_TOKEN_VAR) {
            Some(raw) => parse_flag(TRACE_TOKEN_VAR, &raw)?,
            None => false,
        };

        let file_path = source
            .optional(FILE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_PATH));

        Ok(Self {
            credentials,
            hostname: source.required(HOSTNAME_VAR)?,
            site_path: source.required(SITE_PATH_VAR)?,
            document_library: source.required(DOCUMENT_LIBRARY_VAR)?,
            file_path,
            endpoints,
            options,
            request_timeout,
            trace_token,
        })
    }
}

struct Source<F> {
    lookup: F,
}

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Present and non-blank, trimmed.
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    #[track_caller]
    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing {
            location: ErrorLocation::from(Location::caller()),
            name,
        })
    }
}

#[track_caller]
fn invalid(name: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        location: ErrorLocation::from(Location::caller()),
        name,
        reason: reason.to_string(),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let timeout = humantime::parse_duration(raw).map_err(|e| invalid(HTTP_TIMEOUT_VAR, e))?;
    if timeout.is_zero() {
        return Err(invalid(HTTP_TIMEOUT_VAR, "timeout must be greater than zero"));
    }
    Ok(timeout)
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(invalid(name, format!("expected a boolean, got '{other}'"))),
    }
}

fn process_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(env::VarError::NotUnicode(_)) => {
            warn!("Env var {name} contains invalid unicode, ignoring it");
            None
        }
    }
}
