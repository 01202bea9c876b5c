//! HTTP transport seam.
//!
//! The client only builds [`HttpRequest`] values; a [`Transport`] carries them
//! over the wire. [`ReqwestTransport`] is the blocking reqwest backend used by
//! default, tests plug in their own implementations.

use crate::{ClientConfig, Error, RawResponse, Result};
use reqwest::blocking::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-built outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL including the query string
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes requests built by the client
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<RawResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<RawResponse> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<RawResponse> {
        (**self).execute(request)
    }
}

/// Blocking reqwest backend
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a reqwest client using the timeout and user agent from `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if config.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(config.timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an already-configured reqwest client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<RawResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let req = builder
            .build()
            .map_err(|e| Error::Request(format!("unable to create request: {}", e)))?;

        let res = self
            .client
            .execute(req)
            .map_err(|e| Error::Transport(format!("client failed to execute request: {}", e)))?;

        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = res
            .bytes()
            .map_err(|e| Error::Decode(format!("unable to read response body: {}", e)))?;

        Ok(RawResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = HttpRequest {
            method: Method::Post,
            url: "https://api.urlbox.io/v1/render".into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: None,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn test_reqwest_transport_builds_from_default_config() {
        assert!(ReqwestTransport::new(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let cfg = ClientConfig {
            timeout_ms: 2000,
            ..Default::default()
        };
        let t = ReqwestTransport::new(&cfg).unwrap();
        // Port 9 (discard) on localhost is expected to refuse connections
        let res = t.execute(HttpRequest {
            method: Method::Get,
            url: "http://127.0.0.1:9/".into(),
            headers: Vec::new(),
            body: None,
        });
        assert!(matches!(res, Err(Error::Transport(_))));
    }

    #[test]
    fn test_invalid_header_name_is_request_error() {
        let t = ReqwestTransport::new(&ClientConfig::default()).unwrap();
        let res = t.execute(HttpRequest {
            method: Method::Get,
            url: "http://127.0.0.1:9/".into(),
            headers: vec![("bad header".into(), "x".into())],
            body: None,
        });
        assert!(matches!(res, Err(Error::Request(_))));
    }

    #[test]
    fn test_invalid_configured_header_fails_before_sending() {
        let mut cfg = ClientConfig {
            base_url: "http://127.0.0.1:9/v1/".into(),
            api_key: "KEY".into(),
            ..Default::default()
        };
        cfg.headers.insert("bad header".into(), "x".into());
        let client = crate::client::Client::new(cfg).unwrap();
        let res = client.screenshot(&crate::ScreenshotRequest::new("https://example.com"));
        assert!(matches!(res, Err(Error::Request(_))));
    }

    #[test]
    fn test_from_client_uses_the_supplied_client() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr();
        let handle = std::thread::spawn(move || {
            let req = server.recv().unwrap();
            let agent = req
                .headers()
                .iter()
                .find(|h| h.field.equiv("User-Agent"))
                .map(|h| h.value.as_str().to_string());
            let response = tiny_http::Response::from_string("ok")
                .with_status_code(201)
                .with_header(
                    "Content-Type: text/plain"
                        .parse::<tiny_http::Header>()
                        .unwrap(),
                );
            req.respond(response).unwrap();
            agent
        });

        let client = Client::builder().user_agent("custom-agent/1.0").build().unwrap();
        let t = ReqwestTransport::from_client(client);
        let res = t
            .execute(HttpRequest {
                method: Method::Get,
                url: format!("http://{}/", addr),
                headers: Vec::new(),
                body: None,
            })
            .unwrap();

        assert_eq!(res.status, 201);
        assert_eq!(res.content_type.as_deref(), Some("text/plain"));
        assert_eq!(res.body, b"ok");
        assert_eq!(handle.join().unwrap().as_deref(), Some("custom-agent/1.0"));
    }
}
