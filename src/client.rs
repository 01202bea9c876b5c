//! Request dispatcher: builds render requests, attaches credentials and sends
//! them through a [`Transport`].

use crate::request::{AsyncRequest, ScreenshotRequest};
use crate::response::{RawResponse, RenderResult, ASYNC_ACCEPTED_MESSAGE};
use crate::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use crate::{ClientConfig, Error, Result};
use log::{debug, warn};
use serde::Serialize;

/// Urlbox API client.
///
/// Configuration is read-only after construction, so a single client can be
/// shared across threads issuing independent calls.
pub struct Client<T: Transport = ReqwestTransport> {
    config: ClientConfig,
    base_url: String,
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Create a client backed by the blocking reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Client<T> {
    /// Create a client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Self {
            config,
            base_url,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL with a guaranteed trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Render synchronously via GET and return the raw body.
    ///
    /// Every option is flattened into the query string; the API key travels
    /// in the path. The body is returned whatever the status, so callers can
    /// inspect `status` before trusting the bytes.
    pub fn screenshot(&self, request: &ScreenshotRequest) -> Result<RawResponse> {
        request.validate()?;
        let api_key = self.api_key()?;
        let resolved = request.resolve();
        let path = format!(
            "{}/{}?{}",
            path_segment(api_key)?,
            resolved.format,
            resolved.query_string()
        );
        self.send(Method::Get, &path, None)
    }

    /// Submit a webhook render.
    ///
    /// Returns [`ASYNC_ACCEPTED_MESSAGE`] when the API answers 200 or 201;
    /// any other status is an [`Error::AsyncUnsuccessful`].
    pub fn screenshot_async(&self, request: &AsyncRequest) -> Result<&'static str> {
        request.validate()?;
        let res = self.send_json("render", request)?;
        match res.status {
            200 | 201 => Ok(ASYNC_ACCEPTED_MESSAGE),
            status => {
                warn!("async render for {} rejected with status {}", request.url, status);
                Err(Error::AsyncUnsuccessful { status })
            }
        }
    }

    /// Render synchronously via the JSON endpoint and return where the
    /// result is stored.
    pub fn render(&self, request: &ScreenshotRequest) -> Result<RenderResult> {
        request.validate()?;
        let res = self.send_json("render/sync", &request.resolve())?;
        if !res.is_success() {
            return Err(Error::Api {
                status: res.status,
                body: String::from_utf8_lossy(&res.body).into_owned(),
            });
        }
        res.json()
    }

    /// Serialize `body` as JSON and POST it to `path`
    pub fn send_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<RawResponse> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| Error::Request(format!("unable to marshal request body: {}", e)))?;
        self.send(Method::Post, path, Some(bytes))
    }

    /// Send a request to `{base_url}{path}`.
    ///
    /// POST requests carry `Authorization: Bearer <token>` and, when a body
    /// is present, `Content-Type: application/json`. GET requests rely on
    /// the API key already embedded in `path`.
    pub fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<RawResponse> {
        let mut headers: Vec<(String, String)> = self
            .config
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if method == Method::Post {
            let token = self
                .config
                .bearer_token
                .as_deref()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    Error::Config("a bearer token is required for POST requests".into())
                })?;
            headers.push(("Authorization".into(), format!("Bearer {}", token)));
        }
        if body.is_some() {
            headers.push(("Content-Type".into(), "application/json".into()));
        }

        let path = path.trim_start_matches('/');
        debug!("{} {}{}", method, self.base_url, self.redact(path));

        self.transport.execute(HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        })
    }

    fn api_key(&self) -> Result<&str> {
        let key = self.config.api_key.trim();
        if key.is_empty() {
            return Err(Error::Config(
                "an api key is required for screenshot requests".into(),
            ));
        }
        Ok(key)
    }

    fn redact(&self, path: &str) -> String {
        let key = self.config.api_key.trim();
        if key.is_empty() {
            return path.to_string();
        }
        let redacted = path.replace(key, "<api-key>");
        match path_segment(key) {
            Ok(encoded) => redacted.replace(&encoded, "<api-key>"),
            Err(_) => redacted,
        }
    }
}

/// Percent-encode `raw` as a single path segment (`/`, `?`, `#` and `%`
/// included), so it can never split into extra segments or a query.
fn path_segment(raw: &str) -> Result<String> {
    let mut scratch = url::Url::parse("http://localhost/")
        .map_err(|e| Error::Request(format!("unable to encode path segment: {}", e)))?;
    scratch
        .path_segments_mut()
        .map_err(|_| Error::Request("unable to encode path segment".into()))?
        .clear()
        .push(raw);
    Ok(scratch.path().trim_start_matches('/').to_string())
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("invalid base url {:?}: {}", raw, e)))?;
    if parsed.cannot_be_a_base() {
        return Err(Error::Config(format!("invalid base url {:?}", raw)));
    }
    let mut base = parsed.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}
