//! Access to the lead-generation backend that owns campaigns, niches and transactions.
//!
//! The `Backend` trait is the seam: `HttpBackend` talks to the real REST API, `TestBackend` serves
//! seed data from memory so the whole program can run without a server.

mod http;
mod test_backend;

use crate::model::{Campaign, DateRange, Niche, Snapshot, Transaction};
use crate::{Config, Result};
use anyhow::Context;
use tracing::debug;

pub(crate) use http::HttpBackend;
pub(crate) use test_backend::TestBackend;

/// Setting this environment variable to any non-empty value swaps the HTTP backend for the
/// in-memory test backend.
pub const TEST_MODE_ENV: &str = "EARNINGS_IN_TEST_MODE";

/// The backend's list endpoints.
#[async_trait::async_trait]
pub trait Backend {
    /// Transactions created within `range`.
    async fn transactions(&self, range: DateRange) -> Result<Vec<Transaction>>;

    async fn campaigns(&self) -> Result<Vec<Campaign>>;

    async fn niches(&self) -> Result<Vec<Niche>>;
}

/// Whether we talk to the real backend or to in-memory test data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` when `EARNINGS_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the backend selected by `mode`.
pub(crate) async fn backend(config: &Config, mode: Mode) -> Result<Box<dyn Backend + Send + Sync>> {
    match mode {
        Mode::Http => Ok(Box::new(HttpBackend::new(config).await?)),
        Mode::Test => {
            debug!("Using the in-memory test backend");
            Ok(Box::new(TestBackend::default()))
        }
    }
}

/// Fetches all three lists for `range` and assembles them into one snapshot. Any failure fails the
/// whole fetch so that partial data is never aggregated.
pub async fn fetch_snapshot(backend: &(dyn Backend + Send + Sync), range: DateRange) -> Result<Snapshot> {
    let transactions = backend
        .transactions(range)
        .await
        .context("Failed to fetch transactions")?;
    let campaigns = backend
        .campaigns()
        .await
        .context("Failed to fetch campaigns")?;
    let niches = backend.niches().await.context("Failed to fetch niches")?;
    debug!(
        "Fetched {} transactions, {} campaigns and {} niches",
        transactions.len(),
        campaigns.len(),
        niches.len()
    );
    Ok(Snapshot::new(range, transactions, campaigns, niches))
}
