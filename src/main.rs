use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use urlbox::{AsyncRequest, Client, ClientConfig, FileFormat, ScreenshotRequest};

#[derive(Parser)]
#[command(name = "urlbox", version, about = "Render websites through the Urlbox API")]
struct Cli {
    /// Publishable API key (GET renders)
    #[arg(long, env = "URLBOX_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Secret sent as a bearer token (JSON renders)
    #[arg(long, env = "URLBOX_BEARER_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "URLBOX_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Transport timeout in milliseconds
    #[arg(long, env = "URLBOX_TIMEOUT_MS", global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render synchronously and write the file
    Screenshot {
        #[command(flatten)]
        render: RenderArgs,
        /// Output path (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render via the JSON endpoint and print where the result is stored
    Render {
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Submit a render whose result is posted to a webhook
    Webhook {
        url: String,
        #[arg(long)]
        webhook_url: String,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Website to render
    url: String,
    #[arg(short, long)]
    format: Option<FileFormat>,
    #[arg(long)]
    full_page: Option<bool>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    block_ads: Option<bool>,
    #[arg(long)]
    hide_cookie_banners: Option<bool>,
    #[arg(long)]
    click_accept: Option<bool>,
    #[arg(long)]
    selector: Option<String>,
    #[arg(long)]
    fail_if_selector_missing: Option<bool>,
    #[arg(long)]
    retina: Option<bool>,
    #[arg(long)]
    quality: Option<u32>,
    /// Milliseconds to wait before capturing
    #[arg(long)]
    delay: Option<u64>,
    /// Milliseconds to wait for the page to respond
    #[arg(long)]
    timeout: Option<u64>,
    /// File name for a downloadable render
    #[arg(long)]
    download: Option<String>,
}

impl RenderArgs {
    fn into_request(self) -> ScreenshotRequest {
        let mut req = ScreenshotRequest::new(self.url);
        req.format = self.format;
        let o = &mut req.options;
        o.full_page = self.full_page;
        o.width = self.width;
        o.blocking.block_ads = self.block_ads;
        o.blocking.hide_cookie_banners = self.hide_cookie_banners;
        o.blocking.click_accept = self.click_accept;
        o.selector.selector = self.selector;
        o.selector.fail_if_selector_missing = self.fail_if_selector_missing;
        o.image.retina = self.retina;
        o.image.quality = self.quality;
        o.wait.delay = self.delay;
        o.wait.timeout = self.timeout;
        o.download = self.download;
        req
    }
}

impl Cli {
    fn config(&self) -> ClientConfig {
        let mut cfg = ClientConfig::default();
        if let Some(key) = &self.api_key {
            cfg.api_key = key.clone();
        }
        cfg.bearer_token = self.token.clone();
        if let Some(base) = &self.base_url {
            cfg.base_url = base.clone();
        }
        if let Some(ms) = self.timeout_ms {
            cfg.timeout_ms = ms;
        }
        cfg
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let client = Client::new(cli.config()).context("failed to create client")?;

    match cli.command {
        Command::Screenshot { render, out } => {
            let res = client
                .screenshot(&render.into_request())
                .context("screenshot request failed")?;
            if !res.is_success() {
                anyhow::bail!(
                    "API returned status {}: {}",
                    res.status,
                    String::from_utf8_lossy(&res.body)
                );
            }
            match out {
                Some(path) => std::fs::write(&path, &res.body)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => std::io::stdout()
                    .write_all(&res.body)
                    .context("failed to write to stdout")?,
            }
        }
        Command::Render { render } => {
            let result = client
                .render(&render.into_request())
                .context("render request failed")?;
            println!("{} ({} bytes)", result.render_url, result.size);
        }
        Command::Webhook { url, webhook_url } => {
            let msg = client
                .screenshot_async(&AsyncRequest::new(url, webhook_url))
                .context("async render failed")?;
            println!("{}", msg);
        }
    }
    Ok(())
}
