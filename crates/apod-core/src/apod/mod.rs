//! APOD collaborators: which date to fetch, the metadata API, and the image GET.
//!
//! These sit outside the ingest core. Network calls are blocking (libcurl);
//! call them from `spawn_blocking` when used from async code.

mod client;
mod date;

pub use client::ApodClient;
pub use date::{first_apod_date, resolve_date, DateError};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::url_model;

/// Metadata returned by the APOD API for one date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApodInfo {
    pub date: NaiveDate,
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub hdurl: Option<String>,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

fn default_media_type() -> String {
    "image".to_string()
}

impl ApodInfo {
    /// URL of the image to download (the standard-resolution `url`).
    pub fn image_url(&self) -> &str {
        &self.url
    }

    /// File name hint for storage, from the image URL's last path segment.
    pub fn suggested_name(&self) -> String {
        url_model::derive_filename(self.image_url())
    }

    /// Some APOD days are videos; their `url` points at an embed page.
    pub fn is_image(&self) -> bool {
        self.media_type.eq_ignore_ascii_case("image")
    }
}

/// Failures of the network collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The API has no entry for the request (HTTP 404, or 400 for out-of-range dates).
    #[error("not found: {url} (HTTP {status}){}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    NotFound {
        url: String,
        status: u32,
        message: Option<String>,
    },

    /// Transport failure or a non-2xx status other than not-found.
    #[error("remote unavailable: {url}: {reason}")]
    RemoteUnavailable { url: String, reason: String },

    /// The download succeeded but carried no bytes.
    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    /// The metadata response was not the JSON we expect.
    #[error("invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}
