//! Sector page fetching.
//!
//! A [`PageSession`] loads one page and waits, up to a bounded time, for the
//! result table to appear. [`SectorFetcher`] owns the session for the whole
//! run and builds the per-sector URLs.
//!
//! # Example
//!
//! ```no_run
//! use sectorlens_data::fetch::{FetchOutcome, HttpSession, PageView, SectorFetcher};
//! use sectorlens_data::SectorDescriptor;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut fetcher = SectorFetcher::new(HttpSession::new()?);
//!     let view = PageView::new("shares_fundamental2", "p_e", Duration::from_secs(20));
//!     let sector = SectorDescriptor::new(2, "БАНКИ");
//!
//!     if let FetchOutcome::Found(table) = fetcher.fetch(&sector, &view).await {
//!         println!("{} rows", table.rows().len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod chrome;
pub mod http;

pub use chrome::ChromeSession;
pub use http::HttpSession;

use crate::record::SectorDescriptor;
use crate::table::{RESULT_TABLE_CLASS, RenderedTable};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Root of the source's fundamentals pages.
pub const DEFAULT_BASE_URL: &str = "https://smart-lab.ru/q";

/// Outcome of loading one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result table appeared within the wait.
    Found(RenderedTable),
    /// The table did not appear in time, or the page could not be loaded.
    NotFound,
}

impl FetchOutcome {
    /// The table, if one was found.
    pub fn into_table(self) -> Option<RenderedTable> {
        match self {
            Self::Found(table) => Some(table),
            Self::NotFound => None,
        }
    }
}

/// A page-rendering client.
///
/// Implementations never fail per page: a timeout, a missing table or a
/// transport error all resolve to [`FetchOutcome::NotFound`]. Errors that
/// make the session unusable belong to session construction.
pub trait PageSession {
    /// Load `url` and wait at most `wait` for the first element with class
    /// `table_class`, returning its text content.
    fn fetch_table(
        &mut self,
        url: &str,
        table_class: &str,
        wait: Duration,
    ) -> impl Future<Output = FetchOutcome> + Send;
}

/// A metric page of the source site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView {
    /// Page path segment, e.g. `"shares_fundamental2"`.
    pub page: &'static str,
    /// Metric selector passed as the `field` query parameter.
    pub field: &'static str,
    /// Upper bound on the wait for the result table.
    pub wait: Duration,
}

impl PageView {
    /// Create a page view.
    pub const fn new(page: &'static str, field: &'static str, wait: Duration) -> Self {
        Self { page, field, wait }
    }
}

/// Fetches sector pages through a session acquired once per run.
#[derive(Debug)]
pub struct SectorFetcher<S> {
    session: S,
    base_url: String,
    table_class: String,
}

impl<S: PageSession> SectorFetcher<S> {
    /// Create a fetcher for the public source site.
    pub fn new(session: S) -> Self {
        Self {
            session,
            base_url: DEFAULT_BASE_URL.to_string(),
            table_class: RESULT_TABLE_CLASS.to_string(),
        }
    }

    /// Use a different site root (trailing slash optional).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// URL of `view` filtered to `sector`.
    pub fn url(&self, sector: &SectorDescriptor, view: &PageView) -> String {
        format!(
            "{}/{}/?sector_id%5B%5D={}&field={}",
            self.base_url, view.page, sector.id, view.field
        )
    }

    /// Load the result table of `view` for `sector`.
    pub async fn fetch(&mut self, sector: &SectorDescriptor, view: &PageView) -> FetchOutcome {
        let url = self.url(sector, view);
        debug!(sector = %sector, %url, wait = ?view.wait, "fetching sector page");

        let outcome = self
            .session
            .fetch_table(&url, &self.table_class, view.wait)
            .await;
        if outcome == FetchOutcome::NotFound {
            warn!(sector = %sector, field = view.field, "result table not found, sector skipped");
        }
        outcome
    }

    /// The underlying session.
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Give the session back, e.g. to release it explicitly.
    pub fn into_session(self) -> S {
        self.session
    }
}
