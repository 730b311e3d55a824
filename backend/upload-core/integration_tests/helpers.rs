use upload_core::config::Endpoints;
use upload_core::{AccessToken, ClientCredentials, SharePointClient, SiteId};

use common::RedactedSecret;

use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TENANT_ID: &str = "tenant-1";
pub const CLIENT_ID: &str = "client-1";
pub const CLIENT_SECRET: &str = "secret-1";
pub const SITE_HOSTNAME: &str = "contoso.sharepoint.com";
pub const SITE_PATH: &str = "sites/team";
pub const SITE_ID: &str = "contoso.sharepoint.com,1111,2222";
pub const LIBRARY: &str = "Documents";
pub const FILE_NAME: &str = "report.bin";
pub const UPLOAD_PATH: &str = "/upload/session-1";
pub const ONE_MIB: usize = 1024 * 1024;

pub fn endpoints(server: &MockServer) -> Endpoints {
    Endpoints::new(&server.uri(), &format!("{}/v1.0", server.uri())).unwrap()
}

pub fn client(server: &MockServer) -> SharePointClient {
    SharePointClient::new(endpoints(server)).unwrap()
}

pub fn credentials() -> ClientCredentials {
    ClientCredentials {
        client_id: CLIENT_ID.to_string(),
        client_secret: RedactedSecret::new(CLIENT_SECRET),
        tenant_id: TENANT_ID.to_string(),
    }
}

pub fn token() -> AccessToken {
    AccessToken::new("T1")
}

pub fn site_id() -> SiteId {
    SiteId::new(SITE_ID)
}

pub fn token_path() -> String {
    format!("/{TENANT_ID}/oauth2/v2.0/token")
}

pub fn site_lookup_path() -> String {
    format!("/v1.0/sites/{SITE_HOSTNAME}:/{SITE_PATH}")
}

pub fn session_path() -> String {
    format!("/v1.0/sites/{SITE_ID}/drive/root:/{LIBRARY}/{FILE_NAME}:/createUploadSession")
}

pub fn upload_url(server: &MockServer) -> String {
    format!("{}{UPLOAD_PATH}", server.uri())
}

/// Writes `size` patterned bytes to `{tempdir}/report.bin`.
pub fn write_source(size: usize) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join(FILE_NAME);
    let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    std::fs::write(&file_path, data).unwrap();
    (dir, file_path)
}

pub async fn mount_token(server: &MockServer, access_token: &str) {
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": access_token,
        })))
        .mount(server)
        .await;
}

pub async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(site_lookup_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": SITE_ID })))
        .mount(server)
        .await;
}

pub async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(session_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploadUrl": upload_url(server),
            "expirationDateTime": "2030-01-01T00:00:00Z",
        })))
        .mount(server)
        .await;
}

/// Every PUT answers 202 except the one ending at `total`, which answers 200 with a drive item.
pub async fn mount_chunks(server: &MockServer, total: usize) {
    let last_range = format!("bytes {}-{}/{total}", last_start(total), total - 1);

    Mock::given(method("PUT"))
        .and(path(UPLOAD_PATH))
        .and(wiremock::matchers::header("content-range", last_range.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "item-1",
            "name": FILE_NAME,
            "size": total,
            "webUrl": "https://contoso.sharepoint.com/sites/team/Documents/report.bin",
        })))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path(UPLOAD_PATH))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({ "nextExpectedRanges": ["0-"] })),
        )
        .mount(server)
        .await;
}

fn last_start(total: usize) -> usize {
    let chunk = upload_core::CHUNK_SIZE;
    ((total - 1) / chunk) * chunk
}

pub async fn requests_with_method(server: &MockServer, verb: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.method.as_str() == verb)
        .collect()
}

pub fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
