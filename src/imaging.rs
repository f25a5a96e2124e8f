use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

use crate::config::ImageHostConfig;

/// Folder the host stores covers under; part of the public id.
const COVER_FOLDER: &str = "book-covers";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image host request failed")]
    Http(#[from] reqwest::Error),

    #[error("image host rejected the request: {0}")]
    Rejected(String),
}

/// External image-hosting capability. Both operations are best-effort from
/// the caller's point of view: a failure must never abort the entity
/// operation that triggered it.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload an image and return its hosted URL.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, ImageError>;

    /// Delete a previously uploaded image by public id. `Ok(false)` means
    /// the host answered but did not confirm the deletion.
    async fn delete(&self, public_id: &str) -> Result<bool, ImageError>;
}

/// Recover the host's deletion key from a hosted-image URL.
///
/// URLs look like `https://res.example.com/<cloud>/image/upload/<version>/<folder>/<file>`.
/// The segment right after `upload` is skipped as the version marker (no
/// format check); everything past it, joined with `/`, is the public id.
pub fn extract_public_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    if segments.len() < 3 {
        return None;
    }
    let upload_idx = segments.iter().position(|s| *s == "upload")?;
    let rest = segments.get(upload_idx + 2..)?;
    if rest.is_empty() {
        return None;
    }
    let public_id = rest.join("/");
    let public_id = public_id.trim_end_matches('/');
    if public_id.is_empty() {
        None
    } else {
        Some(public_id.to_string())
    }
}

/// Cloudinary-compatible upload API client.
pub struct CloudinaryImages {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryImages {
    pub fn new(config: &ImageHostConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.cloud_name, action
        )
    }

    // Params must already be sorted by key.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut to_sign = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        to_sign.push_str(&self.api_secret);
        hex::encode(Sha256::digest(to_sign.as_bytes()))
    }
}

#[async_trait]
impl ImageStore for CloudinaryImages {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, ImageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", COVER_FOLDER), ("timestamp", &timestamp)]);

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", COVER_FOLDER)
            .text("timestamp", timestamp)
            .text("api_key", self.api_key.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Rejected(body));
        }

        let upload: UploadResponse = response.json().await?;
        Ok(upload.secure_url)
    }

    async fn delete(&self, public_id: &str) -> Result<bool, ImageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let params = [
            ("public_id", public_id),
            ("timestamp", &timestamp),
            ("api_key", &self.api_key),
            ("signature_algorithm", "sha256"),
            ("signature", &signature),
        ];

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Rejected(body));
        }

        let destroy: DestroyResponse = response.json().await?;
        Ok(destroy.result == "ok")
    }
}
