use crate::client::Client;
use crate::request::{AsyncRequest, ScreenshotRequest};
use crate::response::{RawResponse, RenderResult};
use crate::transport::Transport;
use crate::{ClientConfig, Error, Result};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Screenshot(ScreenshotRequest, oneshot::Sender<Result<RawResponse>>),
    ScreenshotAsync(AsyncRequest, oneshot::Sender<Result<&'static str>>),
    Render(ScreenshotRequest, oneshot::Sender<Result<RenderResult>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly client backed by a dedicated worker thread.
///
/// The worker thread owns a blocking [`Client`] and executes commands sent
/// from async tasks, so the blocking transport is never created, used or
/// dropped on a runtime thread. Clones share the same worker.
#[derive(Clone)]
pub struct AsyncClient {
    cmd_tx: Sender<Command>,
}

impl AsyncClient {
    /// Create a client with the default reqwest transport (spawns a
    /// background thread that owns it).
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        thread::spawn(move || {
            // Build the blocking client on the worker thread
            let client = match Client::new(config) {
                Ok(c) => c,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };
            let _ = init_tx.send(Ok(()));
            run_worker(client, cmd_rx);
        });

        let init_res = init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Move an existing client onto a worker thread
    pub fn from_client<T: Transport + 'static>(client: Client<T>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        thread::spawn(move || run_worker(client, cmd_rx));
        Self { cmd_tx }
    }

    /// See [`Client::screenshot`]
    pub async fn screenshot(&self, request: ScreenshotRequest) -> Result<RawResponse> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(Command::Screenshot(request, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Screenshot canceled: {}", e)))?
    }

    /// See [`Client::screenshot_async`]
    pub async fn screenshot_async(&self, request: AsyncRequest) -> Result<&'static str> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(Command::ScreenshotAsync(request, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Async render canceled: {}", e)))?
    }

    /// See [`Client::render`]
    pub async fn render(&self, request: ScreenshotRequest) -> Result<RenderResult> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(Command::Render(request, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Render canceled: {}", e)))?
    }

    /// Shut down the background worker. Other clones stop working too.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(Command::Close(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }

    fn dispatch(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| Error::Other("worker thread has stopped".into()))
    }
}

fn run_worker<T: Transport>(client: Client<T>, cmd_rx: Receiver<Command>) {
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            Command::Screenshot(req, resp) => {
                let _ = resp.send(client.screenshot(&req));
            }
            Command::ScreenshotAsync(req, resp) => {
                let _ = resp.send(client.screenshot_async(&req));
            }
            Command::Render(req, resp) => {
                let _ = resp.send(client.render(&req));
            }
            Command::Close(resp) => {
                let _ = resp.send(Ok(()));
                break;
            }
        }
    }
    log::debug!("urlbox worker thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpRequest;
    use crate::ASYNC_ACCEPTED_MESSAGE;

    struct StatusTransport(u16);

    impl Transport for StatusTransport {
        fn execute(&self, request: HttpRequest) -> Result<RawResponse> {
            Ok(RawResponse::new(self.0, request.url.into_bytes()))
        }
    }

    fn client(status: u16) -> AsyncClient {
        let cfg = ClientConfig {
            api_key: "KEY".into(),
            bearer_token: Some("TOKEN".into()),
            ..Default::default()
        };
        AsyncClient::from_client(Client::with_transport(cfg, StatusTransport(status)).unwrap())
    }

    #[tokio::test]
    async fn test_screenshot_runs_on_worker() {
        let c = client(200);
        let res = c
            .screenshot(ScreenshotRequest::new("https://example.com"))
            .await
            .unwrap();
        let url = String::from_utf8(res.body).unwrap();
        assert!(url.starts_with("https://api.urlbox.io/v1/KEY/png?url="));
    }

    #[tokio::test]
    async fn test_async_render_status_is_mapped() {
        let ok = client(201);
        assert_eq!(
            ok.screenshot_async(AsyncRequest::new("https://a.b", "https://c.d"))
                .await
                .unwrap(),
            ASYNC_ACCEPTED_MESSAGE
        );

        let rejected = client(500);
        assert!(matches!(
            rejected
                .screenshot_async(AsyncRequest::new("https://a.b", "https://c.d"))
                .await,
            Err(Error::AsyncUnsuccessful { status: 500 })
        ));
    }

    #[tokio::test]
    async fn test_validation_errors_come_back_through_worker() {
        let c = client(200);
        assert!(matches!(
            c.render(ScreenshotRequest::new("")).await,
            Err(Error::UrlRequired)
        ));
    }

    #[tokio::test]
    async fn test_calls_after_close_fail() {
        let c = client(200);
        let other = c.clone();
        c.close().await.unwrap();
        let res = other
            .screenshot(ScreenshotRequest::new("https://example.com"))
            .await;
        assert!(matches!(res, Err(Error::Other(_))));
    }
}
