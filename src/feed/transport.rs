// src/feed/transport.rs
//! HTTP transport seam for the feed adapters. Production uses `reqwest` with
//! a bounded timeout; tests inject stub transports to simulate fixtures and
//! upstream failures.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

/// Single outbound GET, body returned as text. `auth` becomes the raw
/// `Authorization` header value when present.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get_text(&self, url: &str, auth: Option<&str>) -> Result<String>;
}

pub struct ReqwestFetch {
    http: reqwest::Client,
}

impl ReqwestFetch {
    pub fn new() -> Self {
        // The RSS mirror rejects default client UAs, hence the browser-ish
        // user agent. One client is shared across all adapters.
        let http = reqwest::Client::builder()
            .user_agent(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self { http }
    }
}

impl Default for ReqwestFetch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get_text(&self, url: &str, auth: Option<&str>) -> Result<String> {
        let mut req = self.http.get(url).header(
            "Accept",
            "application/rss+xml, application/xml, text/xml, application/json, */*",
        );
        if let Some(token) = auth {
            req = req.header("Authorization", token);
        }
        let resp = req.send().await.with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("GET {url} returned status {status}");
        }
        resp.text().await.with_context(|| format!("GET {url} body"))
    }
}
