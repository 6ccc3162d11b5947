//! Blocking APOD API client (libcurl via the curl crate).

use chrono::NaiveDate;
use std::time::Duration;

use super::{ApodInfo, RemoteError};
use crate::config::ApiConfig;

const USER_AGENT: &str = concat!("apod/", env!("CARGO_PKG_VERSION"));

/// Client for the metadata endpoint and image downloads.
///
/// Holds its credentials explicitly; nothing is read from process globals.
#[derive(Clone)]
pub struct ApodClient {
    base_url: String,
    api_key: String,
    connect_timeout: Duration,
    timeout: Duration,
}

impl std::fmt::Debug for ApodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApodClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ApodClient {
    pub fn new(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            api_key: api.api_key.clone(),
            connect_timeout: Duration::from_secs(api.connect_timeout_secs),
            timeout: Duration::from_secs(api.timeout_secs),
        }
    }

    /// Fetch the APOD metadata for `date`.
    pub fn fetch_metadata(&self, date: NaiveDate) -> Result<ApodInfo, RemoteError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let url = url::Url::parse_with_params(
            &self.base_url,
            &[("api_key", self.api_key.as_str()), ("date", date_str.as_str())],
        )
        .map_err(|e| RemoteError::InvalidResponse {
            url: self.base_url.clone(),
            reason: format!("bad API base URL: {}", e),
        })?;
        // Never put the key in logs or errors.
        let shown = format!("{}?date={}", self.base_url, date_str);

        tracing::debug!(url = %shown, "fetching APOD metadata");
        let (code, body) = self.get(url.as_str(), &shown)?;
        match code {
            200..=299 => {}
            400 | 404 => {
                return Err(RemoteError::NotFound {
                    url: shown,
                    status: code,
                    message: api_error_message(&body),
                })
            }
            _ => {
                return Err(RemoteError::RemoteUnavailable {
                    url: shown,
                    reason: format!("HTTP {}", code),
                })
            }
        }

        let info: ApodInfo =
            serde_json::from_slice(&body).map_err(|e| RemoteError::InvalidResponse {
                url: shown.clone(),
                reason: e.to_string(),
            })?;
        tracing::info!(date = %info.date, title = %info.title, media_type = %info.media_type, "APOD metadata received");
        Ok(info)
    }

    /// Download `url` into memory. An empty body is an error: there is
    /// nothing to ingest.
    pub fn download(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        tracing::debug!(%url, "downloading image");
        let (code, body) = self.get(url, url)?;
        match code {
            200..=299 => {}
            404 => {
                return Err(RemoteError::NotFound {
                    url: url.to_string(),
                    status: code,
                    message: None,
                })
            }
            _ => {
                return Err(RemoteError::RemoteUnavailable {
                    url: url.to_string(),
                    reason: format!("HTTP {}", code),
                })
            }
        }
        if body.is_empty() {
            return Err(RemoteError::EmptyBody {
                url: url.to_string(),
            });
        }
        tracing::info!(%url, bytes = body.len(), "image downloaded");
        Ok(body)
    }

    /// Plain GET following redirects; returns the final status and body.
    fn get(&self, url: &str, shown: &str) -> Result<(u32, Vec<u8>), RemoteError> {
        let unavailable = |e: curl::Error| RemoteError::RemoteUnavailable {
            url: shown.to_string(),
            reason: e.to_string(),
        };

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(unavailable)?;
        easy.follow_location(true).map_err(unavailable)?;
        easy.max_redirections(10).map_err(unavailable)?;
        easy.useragent(USER_AGENT).map_err(unavailable)?;
        easy.connect_timeout(self.connect_timeout)
            .map_err(unavailable)?;
        easy.timeout(self.timeout).map_err(unavailable)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(unavailable)?;
            transfer.perform().map_err(unavailable)?;
        }

        let code = easy.response_code().map_err(unavailable)?;
        Ok((code, body))
    }
}

/// The API reports errors as `{"code": 400, "msg": "..."}`.
fn api_error_message(body: &[u8]) -> Option<String> {
    let v: serde_json::Value = serde_json::from_slice(body).ok()?;
    v.get("msg")
        .or_else(|| v.get("error").and_then(|e| e.get("message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
