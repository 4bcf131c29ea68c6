//! Two-strategy upload: multipart first, clipboard trigger as fallback
//!
//! The companion tool either accepts the PNG directly as a multipart form or,
//! when sent an empty JSON body, uploads whatever image is on the clipboard.
//! Both answer with `{success, result: [url, ...]}`.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

use super::clipboard::Clipboard;
use crate::config::UploadConfig;
use crate::core::notify::{CompletionSignal, Notifier};
use crate::error::{StrategyError, UploadError};
use crate::session::status::{Status, StatusLine};

/// Form field the companion expects the image under
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<Vec<String>>,
}

/// Parse a companion response body into the canonical URL
pub fn parse_response(body: &[u8]) -> Result<String, StrategyError> {
    let response: UploadResponse = serde_json::from_slice(body)?;
    if !response.success {
        return Err(StrategyError::Rejected);
    }
    response
        .result
        .and_then(|urls| urls.into_iter().next())
        .filter(|url| !url.is_empty())
        .ok_or(StrategyError::NoUrl)
}

/// Endpoint with the secret attached as `key`, replacing any existing one
pub fn endpoint_url(config: &UploadConfig) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(config.endpoint.trim())?;
    if !config.secret_key.is_empty() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "key")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("key", &config.secret_key);
    }
    Ok(url)
}

/// File name sent with the multipart upload
pub fn snapshot_file_name() -> String {
    format!("snap-{}.png", chrono::Utc::now().timestamp_millis())
}

/// Upload pipeline bound to a clipboard
pub struct UploadPipeline<C> {
    clipboard: C,
}

impl<C: Clipboard> UploadPipeline<C> {
    pub fn new(clipboard: C) -> Self {
        Self { clipboard }
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Deliver `png` to the configured endpoint, returning the hosted URL
    pub async fn upload(
        &mut self,
        png: &[u8],
        config: &UploadConfig,
        status: &mut dyn StatusLine,
    ) -> Result<String, UploadError> {
        let url = endpoint_url(config).map_err(StrategyError::from)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(StrategyError::from)?;

        if config.use_multipart {
            status.set_status(Status::UploadingMultipart);
            match upload_multipart(&client, url.clone(), png).await {
                Ok(link) => return Ok(link),
                Err(err) => {
                    log::warn!("Multipart upload failed, falling back to clipboard: {}", err)
                }
            }
        }

        status.set_status(Status::WritingClipboard);
        self.clipboard
            .write_image(png)
            .map_err(StrategyError::from)?;
        status.set_status(Status::UploadingClipboard);
        let link = upload_from_clipboard(&client, url).await?;
        Ok(link)
    }

    /// Copy the URL (best effort) and hand the completion signal to `notifier`
    pub fn on_success(&mut self, url: &str, notifier: &mut dyn Notifier) {
        if let Err(err) = self.clipboard.write_text(url) {
            log::warn!("Could not copy URL to clipboard: {}", err);
        }
        notifier.notify_and_close(CompletionSignal {
            url_to_show: url.to_string(),
        });
    }
}

async fn upload_multipart(client: &Client, url: Url, png: &[u8]) -> Result<String, StrategyError> {
    let file_name = snapshot_file_name();
    log::debug!("Multipart upload of {} ({} bytes)", file_name, png.len());
    let part = Part::bytes(png.to_vec())
        .file_name(file_name)
        .mime_str("image/png")?;
    let form = Form::new().part(IMAGE_FIELD, part);
    let body = client.post(url).multipart(form).send().await?.bytes().await?;
    parse_response(&body)
}

async fn upload_from_clipboard(client: &Client, url: Url) -> Result<String, StrategyError> {
    log::debug!("Asking companion to upload the clipboard image");
    let body = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body("{}")
        .send()
        .await?
        .bytes()
        .await?;
    parse_response(&body)
}
