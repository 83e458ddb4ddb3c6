//! Google Drive upload with a public read permission.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};
use url::Url;

use super::PublishedMap;
use crate::config::DriveConfig;
use crate::error::{MapError, MapResult};

const TOKEN_ENV: &str = "DRIVE_ACCESS_TOKEN";

#[derive(Serialize, Debug)]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

#[derive(Serialize, Debug)]
struct Permission {
    role: &'static str,
    #[serde(rename = "type")]
    grantee: &'static str,
}

#[derive(Deserialize, Debug)]
struct UploadedFile {
    id: String,
    #[serde(rename = "webViewLink")]
    web_view_link: Option<String>,
}

pub struct DriveUploader {
    config: DriveConfig,
    token: String,
    client: reqwest::Client,
}

/// Config value first, then the environment.
pub fn resolve_token(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .map(str::to_string)
        .or(from_env)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

impl DriveUploader {
    pub fn new(config: DriveConfig) -> MapResult<Self> {
        let token = resolve_token(config.access_token.as_deref(), std::env::var(TOKEN_ENV).ok())
            .ok_or_else(|| {
                MapError::Publish(format!(
                    "no Drive access token configured (set publish.drive.access_token or {})",
                    TOKEN_ENV
                ))
            })?;
        Ok(Self {
            config,
            token,
            client: reqwest::Client::new(),
        })
    }

    /// Upload `path` into the configured folder and share it with anyone.
    pub async fn publish(&self, path: &Path, file_name: &str) -> MapResult<PublishedMap> {
        let data = tokio::fs::read(path).await?;
        let boundary = format!("georadius-{}", uuid::Uuid::new_v4().simple());
        let metadata = FileMetadata {
            name: file_name,
            mime_type: "application/pdf",
            parents: if self.config.folder_id.is_empty() {
                vec![]
            } else {
                vec![self.config.folder_id.as_str()]
            },
        };
        let body = multipart_related(&boundary, &metadata, &data)?;

        let upload_url = endpoint(
            &self.config.upload_url,
            &[
                ("uploadType", "multipart"),
                ("fields", "id,webViewLink"),
                ("supportsAllDrives", "true"),
            ],
        )?;
        let response = self
            .client
            .post(upload_url)
            .bearer_auth(&self.token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| MapError::Publish(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Drive upload failed with {}: {}", status, error_text);
            return Err(MapError::Publish(format!(
                "Drive upload failed with {}: {}",
                status, error_text
            )));
        }

        let uploaded: UploadedFile = response
            .json()
            .await
            .map_err(|e| MapError::Publish(e.to_string()))?;
        info!("Uploaded {} to Drive as {}", file_name, uploaded.id);

        self.share(&uploaded.id).await?;

        let url = uploaded
            .web_view_link
            .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", uploaded.id));
        Ok(PublishedMap {
            url,
            file_id: Some(uploaded.id),
        })
    }

    async fn share(&self, file_id: &str) -> MapResult<()> {
        let url = endpoint(
            &format!(
                "{}/{}/permissions",
                self.config.api_url.trim_end_matches('/'),
                file_id
            ),
            &[("supportsAllDrives", "true")],
        )?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&Permission {
                role: "reader",
                grantee: "anyone",
            })
            .send()
            .await
            .map_err(|e| MapError::Publish(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Drive permission grant failed with {}: {}", status, error_text);
            return Err(MapError::Publish(format!(
                "Drive permission grant failed with {}: {}",
                status, error_text
            )));
        }
        Ok(())
    }
}

fn endpoint(base: &str, params: &[(&str, &str)]) -> MapResult<Url> {
    Url::parse_with_params(base, params)
        .map_err(|e| MapError::Publish(format!("invalid Drive URL '{}': {}", base, e)))
}

/// `multipart/related` body: JSON metadata part, then the file part.
fn multipart_related(boundary: &str, metadata: &FileMetadata, data: &[u8]) -> MapResult<Vec<u8>> {
    let metadata_json =
        serde_json::to_string(metadata).map_err(|e| MapError::Publish(e.to_string()))?;

    let mut body = Vec::with_capacity(data.len() + metadata_json.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata_json.as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", metadata.mime_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    Ok(body)
}
