//! HDFS uploader client
//!
//! Talks to the platform's uploader application, which stores files in
//! HDFS and hands back an object-store reference. The uploader lives at
//! `hdfs-uploader.<domain>` where `<domain>` is the platform domain
//! embedded in the CF API URL.

use std::path::Path;

use anyhow::{bail, Context, Result};
use reqwest::multipart;
use serde::Deserialize;

use tapdeploy_cf::CfCli;

/// The platform base domain from a CF API URL, e.g. `example.com` from
/// `https://api.example.com`. A URL without an `api.` component is
/// returned unchanged.
pub fn base_url(api_url: &str) -> &str {
    match api_url.split_once("api.") {
        Some((_, domain)) => domain,
        None => api_url,
    }
}

/// The upload endpoint for an organization.
pub fn uploader_endpoint(api_url: &str, org_guid: &str) -> String {
    format!(
        "http://hdfs-uploader.{}/rest/upload/{}",
        base_url(api_url),
        org_guid
    )
}

/// Reference to a stored file, as returned by the uploader service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredObject {
    /// Object store the file landed in, e.g. an `hdfs://` root
    #[serde(rename = "objectStoreId")]
    pub object_store_id: String,
    /// Identifier of the file within that store
    #[serde(rename = "idInObjectStore")]
    pub id_in_object_store: String,
}

impl StoredObject {
    /// Full URI of the stored file.
    pub fn uri(&self) -> String {
        format!("{}/{}", self.object_store_id, self.id_in_object_store)
    }
}

/// One file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    /// Local file to upload
    pub file: &'a Path,
    /// GUID of the organization the file belongs to
    pub org_guid: &'a str,
    /// Uploader category, e.g. `other`
    pub category: &'a str,
    /// Target file name in HDFS
    pub title: &'a str,
    /// Whether the file should be publicly readable
    pub public: bool,
}

/// HTTP client for one uploader endpoint.
pub struct Uploader {
    http: reqwest::Client,
    endpoint: String,
    auth_token: String,
}

impl Uploader {
    /// Create a client for `endpoint`, authorizing with `auth_token`
    /// (an OAuth bearer token from `cf oauth-token`).
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Upload a file and return the stored-object reference.
    pub async fn upload(&self, request: &UploadRequest<'_>) -> Result<StoredObject> {
        let file_name = request
            .file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("file")
            .to_string();
        let bytes = tokio::fs::read(request.file)
            .await
            .with_context(|| format!("failed to read {}", request.file.display()))?;

        tracing::debug!(endpoint = %self.endpoint, file = %file_name, "uploading to HDFS");
        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name))
            .text("orgUUID", request.org_guid.to_string())
            .text("category", request.category.to_string())
            .text("title", request.title.to_string())
            .text("publicRequest", request.public.to_string());

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, self.auth_token.as_str())
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("upload request to {} failed", self.endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read uploader response")?;
        if !status.is_success() {
            bail!("uploader at {} returned {status}: {body}", self.endpoint);
        }

        serde_json::from_str(&body)
            .with_context(|| format!("unexpected uploader response: {body}"))
    }
}

/// Upload a local file to HDFS through the uploader application, using
/// the ambient CLI session for the org GUID and OAuth token. Returns the
/// stored file's URI.
pub async fn upload_to_hdfs(
    cli: &CfCli,
    api_url: &str,
    org: &str,
    file: &Path,
    title: &str,
    category: &str,
) -> Result<String> {
    let org_guid = cli.org_guid(org).await?;
    let token = cli.oauth_token().await?;
    let uploader = Uploader::new(uploader_endpoint(api_url, &org_guid), token);
    let stored = uploader
        .upload(&UploadRequest {
            file,
            org_guid: &org_guid,
            category,
            title,
            public: false,
        })
        .await?;
    Ok(stored.uri())
}

#[cfg(test)]
#[path = "uploader_tests.rs"]
mod tests;
