//! Render request model: options, defaulting, validation and serialization.
//!
//! Every optional field is an `Option`, so "not set" is never confused with
//! `false` or `0`. [`ScreenshotRequest::with_defaults`] fills the unset
//! fields; [`ScreenshotRequest::resolve`] produces the concrete values that
//! go on the wire.

use crate::{Error, FileFormat, Result};
use serde::Serialize;

/// Default viewport width in pixels
pub const DEFAULT_WIDTH: u32 = 1280;
/// Default JPEG/WebP quality
pub const DEFAULT_QUALITY: u32 = 80;
/// Highest accepted image quality
pub const MAX_QUALITY: u32 = 100;
/// Default wait before capture, in milliseconds
pub const DEFAULT_DELAY_MS: u64 = 0;
/// Default time allowed for the target page to respond, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// A request to screenshot (or otherwise render) a single URL.
///
/// # Examples
///
/// ```
/// use urlbox::{FileFormat, ScreenshotRequest};
///
/// let req = ScreenshotRequest::new("https://example.com")
///     .format(FileFormat::Jpeg)
///     .full_page(true)
///     .quality(60);
/// assert!(req.validate().is_ok());
/// assert_eq!(req.resolve().options.quality, 60);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenshotRequest {
    /// URL of the website to render
    pub url: String,
    /// Output file format (png when unset)
    pub format: Option<FileFormat>,
    /// Optional render parameters
    pub options: Options,
}

/// Optional render parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Capture the full scrollable page instead of the viewport
    pub full_page: Option<bool>,
    /// Viewport width in pixels
    pub width: Option<u32>,
    /// Blocking or dismissing page elements such as ads and cookie banners
    pub blocking: Blocking,
    pub selector: Selector,
    pub image: Image,
    pub wait: Wait,
    /// File name for a downloadable render (sets the content-disposition
    /// on the response). The format extension is appended when missing.
    pub download: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocking {
    pub block_ads: Option<bool>,
    pub hide_cookie_banners: Option<bool>,
    /// Click accept buttons to dismiss pop-ups
    pub click_accept: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// CSS selector of the element to capture, e.g. `#playground`
    pub selector: Option<String>,
    /// Fail the render when the selector matches nothing
    pub fail_if_selector_missing: Option<bool>,
}

/// Options for PNG, WebP or JPEG output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    /// Device pixel ratio of 2.0; doubles the output dimensions
    pub retina: Option<bool>,
    /// 0..=100, JPEG/WebP only
    pub quality: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wait {
    /// Milliseconds to wait before capturing
    pub delay: Option<u64>,
    /// Milliseconds to wait for the target URL to respond
    pub timeout: Option<u64>,
}

/// A request with every parameter resolved to a concrete value.
///
/// Serializes to the JSON body accepted by the render endpoints:
/// `{url, format, options: {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRequest {
    pub url: String,
    pub format: FileFormat,
    pub options: ResolvedOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOptions {
    pub full_page: bool,
    pub width: u32,
    pub block_ads: bool,
    pub hide_cookie_banners: bool,
    pub click_accept: bool,
    pub selector: String,
    pub fail_if_selector_missing: bool,
    pub retina: bool,
    pub quality: u32,
    pub delay: u64,
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
}

impl ScreenshotRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn full_page(mut self, full_page: bool) -> Self {
        self.options.full_page = Some(full_page);
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.options.width = Some(width);
        self
    }

    pub fn block_ads(mut self, block: bool) -> Self {
        self.options.blocking.block_ads = Some(block);
        self
    }

    pub fn hide_cookie_banners(mut self, hide: bool) -> Self {
        self.options.blocking.hide_cookie_banners = Some(hide);
        self
    }

    pub fn click_accept(mut self, click: bool) -> Self {
        self.options.blocking.click_accept = Some(click);
        self
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.options.selector.selector = Some(selector.into());
        self
    }

    pub fn fail_if_selector_missing(mut self, fail: bool) -> Self {
        self.options.selector.fail_if_selector_missing = Some(fail);
        self
    }

    pub fn retina(mut self, retina: bool) -> Self {
        self.options.image.retina = Some(retina);
        self
    }

    pub fn quality(mut self, quality: u32) -> Self {
        self.options.image.quality = Some(quality);
        self
    }

    pub fn delay(mut self, delay_ms: u64) -> Self {
        self.options.wait.delay = Some(delay_ms);
        self
    }

    pub fn timeout(mut self, timeout_ms: u64) -> Self {
        self.options.wait.timeout = Some(timeout_ms);
        self
    }

    pub fn download(mut self, file_name: impl Into<String>) -> Self {
        self.options.download = Some(file_name.into());
        self
    }

    /// Reject requests the API would refuse, before any network I/O.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::UrlRequired);
        }
        if let Some(q) = self.options.image.quality {
            if q > MAX_QUALITY {
                return Err(Error::ImageQualityExceeded(q));
            }
        }
        Ok(())
    }

    /// Fill every unset field with its documented default.
    ///
    /// Caller-supplied values are kept as-is, so applying this twice yields
    /// the same request. `download` has no default and stays untouched.
    pub fn with_defaults(mut self) -> Self {
        let o = &mut self.options;
        self.format.get_or_insert(FileFormat::Png);
        o.full_page.get_or_insert(false);
        o.width.get_or_insert(DEFAULT_WIDTH);
        o.blocking.block_ads.get_or_insert(true);
        o.blocking.hide_cookie_banners.get_or_insert(true);
        o.blocking.click_accept.get_or_insert(true);
        o.selector.selector.get_or_insert_with(String::new);
        o.selector.fail_if_selector_missing.get_or_insert(false);
        o.image.retina.get_or_insert(false);
        o.image.quality.get_or_insert(DEFAULT_QUALITY);
        o.wait.delay.get_or_insert(DEFAULT_DELAY_MS);
        o.wait.timeout.get_or_insert(DEFAULT_TIMEOUT_MS);
        self
    }

    /// Concrete wire values for this request (defaults applied).
    pub fn resolve(&self) -> ResolvedRequest {
        let d = self.clone().with_defaults();
        let format = d.format.unwrap_or_default();
        let o = d.options;
        let download = o
            .download
            .as_deref()
            .and_then(|name| download_file_name(name, format));

        ResolvedRequest {
            url: d.url,
            format,
            options: ResolvedOptions {
                full_page: o.full_page.unwrap_or(false),
                width: o.width.unwrap_or(DEFAULT_WIDTH),
                block_ads: o.blocking.block_ads.unwrap_or(true),
                hide_cookie_banners: o.blocking.hide_cookie_banners.unwrap_or(true),
                click_accept: o.blocking.click_accept.unwrap_or(true),
                selector: o.selector.selector.unwrap_or_default(),
                fail_if_selector_missing: o.selector.fail_if_selector_missing.unwrap_or(false),
                retina: o.image.retina.unwrap_or(false),
                quality: o.image.quality.unwrap_or(DEFAULT_QUALITY),
                delay: o.wait.delay.unwrap_or(DEFAULT_DELAY_MS),
                timeout: o.wait.timeout.unwrap_or(DEFAULT_TIMEOUT_MS),
                download,
            },
        }
    }
}

impl ResolvedRequest {
    /// Query parameters in the order the GET endpoint documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let o = &self.options;
        let mut pairs = vec![
            ("url", self.url.clone()),
            ("width", o.width.to_string()),
            ("full_page", o.full_page.to_string()),
            ("block_ads", o.block_ads.to_string()),
            ("hide_cookie_banners", o.hide_cookie_banners.to_string()),
            ("click_accept", o.click_accept.to_string()),
            ("retina", o.retina.to_string()),
            ("quality", o.quality.to_string()),
            ("delay", o.delay.to_string()),
            ("timeout", o.timeout.to_string()),
            ("selector", o.selector.clone()),
            (
                "fail_if_selector_missing",
                o.fail_if_selector_missing.to_string(),
            ),
        ];
        if let Some(name) = &o.download {
            pairs.push(("download", name.clone()));
        }
        pairs
    }

    /// Percent-encoded query string (without the leading `?`).
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}

fn download_file_name(name: &str, format: FileFormat) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let ext = format!(".{}", format.as_str());
    if name.to_ascii_lowercase().ends_with(&ext) {
        Some(name.to_string())
    } else {
        Some(format!("{}{}", name, ext))
    }
}

/// Parameters for a webhook-driven render.
///
/// The service answers immediately and POSTs a [`crate::WebhookEvent`] to
/// `webhook_url` once the render completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AsyncRequest {
    pub url: String,
    pub webhook_url: String,
}

impl AsyncRequest {
    pub fn new(url: impl Into<String>, webhook_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            webhook_url: webhook_url.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::UrlRequired);
        }
        if self.webhook_url.trim().is_empty() {
            return Err(Error::WebhookUrlRequired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_gets_documented_defaults() {
        let r = ScreenshotRequest::new("https://example.com").resolve();
        assert_eq!(r.format, FileFormat::Png);
        let o = r.options;
        assert_eq!(o.width, 1280);
        assert!(!o.full_page);
        assert!(o.block_ads);
        assert!(o.hide_cookie_banners);
        assert!(o.click_accept);
        assert!(!o.fail_if_selector_missing);
        assert!(!o.retina);
        assert_eq!(o.quality, 80);
        assert_eq!(o.delay, 0);
        assert_eq!(o.timeout, 30000);
        assert!(o.selector.is_empty());
        assert!(o.download.is_none());
    }

    #[test]
    fn test_defaulting_is_idempotent() {
        let once = ScreenshotRequest::new("https://example.com")
            .width(800)
            .block_ads(false)
            .with_defaults();
        let twice = once.clone().with_defaults();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_caller_values_survive_defaulting() {
        let d = ScreenshotRequest::new("https://example.com")
            .format(FileFormat::Webp)
            .block_ads(false)
            .quality(0)
            .timeout(5000)
            .with_defaults();
        assert_eq!(d.format, Some(FileFormat::Webp));
        assert_eq!(d.options.blocking.block_ads, Some(false));
        // explicit zero is a value, not "unset"
        assert_eq!(d.options.image.quality, Some(0));
        assert_eq!(d.options.wait.timeout, Some(5000));
        assert_eq!(d.options.blocking.click_accept, Some(true));
    }

    #[test]
    fn test_validation_rejects_missing_url_and_high_quality() {
        assert!(matches!(
            ScreenshotRequest::new("").validate(),
            Err(Error::UrlRequired)
        ));
        assert!(matches!(
            ScreenshotRequest::new("   ").validate(),
            Err(Error::UrlRequired)
        ));
        assert!(matches!(
            ScreenshotRequest::new("https://example.com").quality(101).validate(),
            Err(Error::ImageQualityExceeded(101))
        ));
        assert!(ScreenshotRequest::new("https://example.com")
            .quality(100)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_async_request_requires_webhook() {
        assert!(matches!(
            AsyncRequest::new("", "https://hooks.example.com").validate(),
            Err(Error::UrlRequired)
        ));
        assert!(matches!(
            AsyncRequest::new("https://example.com", "").validate(),
            Err(Error::WebhookUrlRequired)
        ));
        assert!(AsyncRequest::new("https://example.com", "https://hooks.example.com")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_query_string_has_fixed_order_and_encoding() {
        let q = ScreenshotRequest::new("https://example.com/a?b=c")
            .resolve()
            .query_string();
        assert_eq!(
            q,
            "url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc&width=1280&full_page=false\
             &block_ads=true&hide_cookie_banners=true&click_accept=true&retina=false\
             &quality=80&delay=0&timeout=30000&selector=&fail_if_selector_missing=false"
        );
    }

    #[test]
    fn test_selector_and_download_are_placed_last() {
        let r = ScreenshotRequest::new("https://example.com")
            .format(FileFormat::Pdf)
            .selector("#main")
            .download("report")
            .resolve();
        let pairs = r.query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            &keys[keys.len() - 3..],
            &["selector", "fail_if_selector_missing", "download"]
        );
        assert_eq!(pairs.last().map(|(_, v)| v.as_str()), Some("report.pdf"));
    }

    #[test]
    fn test_download_keeps_existing_extension() {
        assert_eq!(
            download_file_name("shot.PNG", FileFormat::Png).as_deref(),
            Some("shot.PNG")
        );
        assert_eq!(
            download_file_name("shot", FileFormat::Jpeg).as_deref(),
            Some("shot.jpeg")
        );
        assert_eq!(download_file_name("  ", FileFormat::Png), None);
    }

    #[test]
    fn test_resolved_request_serializes_as_render_body() {
        let r = ScreenshotRequest::new("https://example.com")
            .format(FileFormat::Jpeg)
            .resolve();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["url"], "https://example.com");
        assert_eq!(v["format"], "jpeg");
        assert_eq!(v["options"]["width"], 1280);
        assert_eq!(v["options"]["block_ads"], true);
        assert_eq!(v["options"]["selector"], "");
        assert!(v["options"].get("download").is_none());
    }
}
