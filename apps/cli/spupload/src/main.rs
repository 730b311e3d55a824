use spupload::exit_code;
use spupload::logger::{LOG_DIR_VAR, initialize as LoggerInitialize};

use upload_core::{CoreError, UploadConfig, run};

use std::env::var_os;
use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logger FIRST
    let log_dir = var_os(LOG_DIR_VAR).map(PathBuf::from);
    if let Err(e) = LoggerInitialize(log_dir.as_deref()) {
        eprintln!("{e}");
        return ExitCode::from(exit_code::LOGGER_FAILURE);
    }

    let result = match UploadConfig::from_env() {
        Ok(config) => run(&config).await,
        Err(e) => Err(CoreError::from(e)),
    };

    match result {
        Ok(report) => {
            info!(
                "File uploaded successfully: {} ({} bytes, {} chunks){}",
                report.file_name,
                report.bytes_sent,
                report.chunks_sent,
                report
                    .item
                    .as_ref()
                    .and_then(|item| item.web_url.as_deref())
                    .map(|url| format!(" at {url}"))
                    .unwrap_or_default()
            );
            ExitCode::from(exit_code::SUCCESS)
        }
        Err(e) => {
            let kind = e.kind();
            error!("Error {}: {e}", kind.stage());
            ExitCode::from(exit_code::for_kind(kind))
        }
    }
}
