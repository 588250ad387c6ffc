//! Plain HTTP page session.
//!
//! The source renders its fundamentals tables on the server, so a single GET
//! is enough. The bounded wait is the request timeout.

use super::{FetchOutcome, PageSession};
use crate::error::{DataError, Result};
use crate::table::RenderedTable;
use std::time::Duration;
use tracing::{debug, warn};

/// User agent sent with every request.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Page session backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::Client,
}

impl HttpSession {
    /// Create a new HTTP session.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self { client })
    }

    async fn load(&self, url: &str, wait: Duration) -> std::result::Result<String, String> {
        let response = self
            .client
            .get(url)
            .timeout(wait)
            .send()
            .await
            .map_err(describe)?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        response.text().await.map_err(describe)
    }
}

fn describe(err: reqwest::Error) -> String {
    if err.is_timeout() {
        "timed out".to_string()
    } else {
        err.to_string()
    }
}

impl PageSession for HttpSession {
    async fn fetch_table(&mut self, url: &str, table_class: &str, wait: Duration) -> FetchOutcome {
        let html = match self.load(url, wait).await {
            Ok(html) => html,
            Err(reason) => {
                warn!(%url, %reason, "page load failed");
                return FetchOutcome::NotFound;
            }
        };
        debug!(%url, bytes = html.len(), "page loaded");

        match RenderedTable::from_html(&html, table_class) {
            Ok(Some(table)) => FetchOutcome::Found(table),
            Ok(None) => FetchOutcome::NotFound,
            Err(e) => {
                warn!(%url, error = %e, "table lookup failed");
                FetchOutcome::NotFound
            }
        }
    }
}
