//! Urlbox client
//!
//! A client library for the [Urlbox](https://urlbox.com) website screenshot
//! API. It builds render requests (query-string GET or JSON POST), fills unset
//! options with documented defaults and hands the raw response back.
//!
//! # Features
//!
//! - **Synchronous renders**: `Client::screenshot` returns the image, PDF or
//!   video bytes straight from the API
//! - **Webhook renders**: `Client::screenshot_async` submits a render whose
//!   result is POSTed to your webhook
//! - **Pluggable transport**: anything implementing `Transport` can carry the
//!   requests; `ReqwestTransport` is the default
//!
//! # Example
//!
//! ```no_run
//! use urlbox::{Client, ClientConfig, FileFormat, ScreenshotRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig {
//!     api_key: "YOUR_API_KEY".to_string(),
//!     ..Default::default()
//! };
//!
//! let client = Client::new(config)?;
//! let request = ScreenshotRequest::new("https://example.com")
//!     .format(FileFormat::Png)
//!     .full_page(true);
//! let shot = client.screenshot(&request)?;
//! std::fs::write("example.png", &shot.body)?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod request;
pub use request::{
    AsyncRequest, Blocking, Image, Options, ResolvedOptions, ResolvedRequest, ScreenshotRequest,
    Selector, Wait,
};

pub mod response;
pub use response::{RawResponse, RenderMeta, RenderResult, WebhookEvent, ASYNC_ACCEPTED_MESSAGE};

pub mod transport;
pub use transport::{HttpRequest, Method, ReqwestTransport, Transport};

pub mod client;
pub use client::Client;

// Async-friendly facade over the blocking client (worker-thread backed)
pub mod async_api;
pub use async_api::AsyncClient;

/// Base endpoint of the Urlbox API
pub const BASE_URL: &str = "https://api.urlbox.io/v1/";

/// Output formats accepted by the render endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Png,
    Jpeg,
    Avif,
    Webp,
    Webm,
    Pdf,
    Svg,
    Html,
    Md,
    Mp4,
}

impl FileFormat {
    pub const ALL: [FileFormat; 10] = [
        FileFormat::Png,
        FileFormat::Jpeg,
        FileFormat::Avif,
        FileFormat::Webp,
        FileFormat::Webm,
        FileFormat::Pdf,
        FileFormat::Svg,
        FileFormat::Html,
        FileFormat::Md,
        FileFormat::Mp4,
    ];

    /// Name used in the request path and JSON body
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Png => "png",
            FileFormat::Jpeg => "jpeg",
            FileFormat::Avif => "avif",
            FileFormat::Webp => "webp",
            FileFormat::Webm => "webm",
            FileFormat::Pdf => "pdf",
            FileFormat::Svg => "svg",
            FileFormat::Html => "html",
            FileFormat::Md => "md",
            FileFormat::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s == "jpg" {
            return Ok(FileFormat::Jpeg);
        }
        FileFormat::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unsupported file format: {}", s)))
    }
}

/// Configuration for the API client
///
/// The defaults point at the public Urlbox endpoint with empty credentials;
/// fill in `api_key` (GET renders) and `bearer_token` (JSON renders) before
/// use, or load both from the environment with [`ClientConfig::from_env`].
///
/// # Examples
///
/// ```
/// let cfg = urlbox::ClientConfig::default();
/// assert_eq!(cfg.base_url, urlbox::BASE_URL);
/// assert!(cfg.bearer_token.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root; request paths are appended to it
    pub base_url: String,
    /// Publishable key, embedded in the path of GET renders
    pub api_key: String,
    /// Secret sent as `Authorization: Bearer` on JSON renders
    pub bearer_token: Option<String>,
    /// Transport timeout in milliseconds (0 => none)
    pub timeout_ms: u64,
    /// User agent string to send with requests
    pub user_agent: String,
    /// Extra HTTP headers added to every request
    pub headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_key: String::new(),
            bearer_token: None,
            timeout_ms: 60000,
            user_agent: concat!("urlbox-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Build a config from `URLBOX_API_KEY`, `URLBOX_BEARER_TOKEN`,
    /// `URLBOX_BASE_URL` and `URLBOX_TIMEOUT_MS`. Unset variables keep their
    /// defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("URLBOX_API_KEY") {
            cfg.api_key = key;
        }
        cfg.bearer_token = non_empty("URLBOX_BEARER_TOKEN");
        if let Some(base) = non_empty("URLBOX_BASE_URL") {
            cfg.base_url = base;
        }
        if let Some(ms) = non_empty("URLBOX_TIMEOUT_MS") {
            cfg.timeout_ms = ms.trim().parse().map_err(|e| {
                Error::Config(format!("URLBOX_TIMEOUT_MS must be an integer: {}", e))
            })?;
        }
        Ok(cfg)
    }
}
