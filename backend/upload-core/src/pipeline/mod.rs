//! Orchestration: token, then site id, then upload. Stops at the first failure.

use crate::client::SharePointClient;
use crate::config::UploadConfig;
use crate::error::CoreError;
use crate::upload::UploadReport;

use log::info;

/// Run the whole upload described by `config`.
///
/// Stages run strictly in order and each consumes only the previous stages'
/// output. A failing stage's error is returned unchanged; later stages never run.
pub async fn run(config: &UploadConfig) -> Result<UploadReport, CoreError> {
    let client = SharePointClient::from_config(config)?;
    run_with_client(&client, config).await
}

/// Same as [`run`] with a caller-supplied client.
pub async fn run_with_client(
    client: &SharePointClient,
    config: &UploadConfig,
) -> Result<UploadReport, CoreError> {
    info!(
        "Getting access token for tenant {}",
        config.credentials.tenant_id
    );
    let token = client.obtain_token(&config.credentials).await?;

    info!(
        "Getting site ID for {}:/{}",
        config.hostname, config.site_path
    );
    let site_id = client
        .resolve_site_id(&token, &config.hostname, &config.site_path)
        .await?;

    info!(
        "Uploading {} to library {}",
        config.file_path.display(),
        config.document_library
    );
    let report = client
        .upload(
            &token,
            &site_id,
            &config.document_library,
            &config.file_path,
            &config.options,
        )
        .await?;

    Ok(report)
}
