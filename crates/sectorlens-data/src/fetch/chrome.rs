//! Headless Chrome page session.
//!
//! Launches one browser with one tab for the whole run. The browser process
//! is shut down when the session is dropped.

use super::{FetchOutcome, PageSession};
use crate::error::{DataError, Result};
use crate::table::RenderedTable;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Page session backed by a headless Chrome tab.
pub struct ChromeSession {
    // Dropping the browser kills the Chrome process.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Launch headless Chrome and open the working tab.
    ///
    /// # Errors
    /// Returns `DataError::Browser` if Chrome cannot be found or started.
    pub fn launch() -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|e| DataError::Browser(e.to_string()))?;
        let browser = Browser::new(options).map_err(|e| DataError::Browser(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| DataError::Browser(format!("Failed to open tab: {e}")))?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Navigate and return the rendered HTML once `selector` is present.
    ///
    /// Navigation and the element wait share one deadline, `wait` from now.
    fn render(tab: &Tab, url: &str, selector: &str, wait: Duration) -> std::result::Result<String, String> {
        let deadline = Instant::now() + wait;
        tab.set_default_timeout(wait);
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| format!("navigation failed: {e}"))?;

        let left = remaining(deadline, Instant::now())
            .ok_or_else(|| "timed out after navigation".to_string())?;
        tab.wait_for_element_with_custom_timeout(selector, left)
            .map_err(|e| format!("table did not appear: {e}"))?;
        tab.get_content()
            .map_err(|e| format!("failed to read page content: {e}"))
    }
}

/// Time left until `deadline`, or `None` once it has passed.
fn remaining(deadline: Instant, now: Instant) -> Option<Duration> {
    Some(deadline.saturating_duration_since(now)).filter(|left| !left.is_zero())
}

impl PageSession for ChromeSession {
    async fn fetch_table(&mut self, url: &str, table_class: &str, wait: Duration) -> FetchOutcome {
        let tab = Arc::clone(&self.tab);
        let target = url.to_string();
        let selector = format!(".{table_class}");

        let rendered =
            tokio::task::spawn_blocking(move || Self::render(&tab, &target, &selector, wait)).await;

        let html = match rendered {
            Ok(Ok(html)) => html,
            Ok(Err(reason)) => {
                warn!(%url, %reason, "page render failed");
                return FetchOutcome::NotFound;
            }
            Err(e) => {
                warn!(%url, error = %e, "browser task failed");
                return FetchOutcome::NotFound;
            }
        };
        debug!(%url, bytes = html.len(), "page rendered");

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

impl fmt::Debug for ChromeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeSession")
            .field("tab", &self.tab.get_target_id())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_wait() {
        let start = Instant::now();
        let deadline = start + Duration::from_secs(20);

        assert_eq!(remaining(deadline, start), Some(Duration::from_secs(20)));
        assert_eq!(
            remaining(deadline, start + Duration::from_secs(15)),
            Some(Duration::from_secs(5))
        );
        assert_eq!(remaining(deadline, deadline), None);
        assert_eq!(remaining(deadline, deadline + Duration::from_secs(1)), None);
    }
}
