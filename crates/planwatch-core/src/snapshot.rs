//! Full reload of the plan collection over HTTP.
//!
//! The event stream has no sequence numbers and no replay, so anything
//! missed while disconnected is only repaired by loading the whole
//! collection again. The client does that at startup and every time the
//! connection enters the connected state.

use log::{debug, info};
use url::Url;

use crate::{
    config::SyncConfig,
    error::{Result, ResultExt, SyncError},
    models::Plan,
};

#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    http: reqwest::Client,
    url: Url,
}

impl SnapshotLoader {
    pub fn new(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }

    /// Builds a loader for the snapshot endpoint of `config`.
    pub fn from_config(http: reqwest::Client, config: &SyncConfig) -> Result<Self> {
        Ok(Self::new(http, config.snapshot_url()?))
    }

    /// Builds a loader with its own HTTP client, for one-off fetches.
    pub fn standalone(config: &SyncConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().build()?;
        Self::from_config(http, config)
    }

    /// Fetches every plan with nested steps, sorted by step order.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Http` when the request fails and
    /// `SyncError::Snapshot` for non-success statuses or undecodable bodies.
    pub async fn load(&self) -> Result<Vec<Plan>> {
        debug!("Fetching snapshot from {}", self.url);
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Snapshot {
                message: format!("HTTP {status}"),
            });
        }

        let body = response.bytes().await?;
        let mut plans: Vec<Plan> =
            serde_json::from_slice(&body).snapshot_context("invalid plan list")?;
        for plan in &mut plans {
            plan.sort_steps();
        }

        info!("Loaded snapshot with {} plans", plans.len());
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Serves one response after `delay`, on a random port.
    async fn serve_after(delay: Duration, status_line: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf).await.unwrap();
            tokio::time::sleep(delay).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/api/plans")).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_snapshot_is_not_cut_short() {
        let url = serve_after(Duration::from_secs(120), "200 OK", "[]").await;
        let loader = SnapshotLoader::new(reqwest::Client::new(), url);

        let plans = loader.load().await.unwrap();
        assert!(plans.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_a_snapshot_error() {
        let url = serve_after(Duration::ZERO, "503 Service Unavailable", "{}").await;
        let loader = SnapshotLoader::new(reqwest::Client::new(), url);

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, SyncError::Snapshot { .. }));
        assert_eq!(
            err.to_string(),
            "Snapshot fetch failed: HTTP 503 Service Unavailable"
        );
    }
}
