use crate::api::{self, Mode};
use crate::commands::Out;
use crate::model::DateRange;
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// What `earnings fetch` downloaded and where it was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSummary {
    pub path: PathBuf,
    pub range: DateRange,
    pub transactions: usize,
    pub campaigns: usize,
    pub niches: usize,
}

/// Downloads transactions for `range` along with all campaigns and niches, and saves them as a new
/// snapshot in `$EARNINGS_HOME/.snapshots`.
pub async fn fetch(config: &Config, mode: Mode, range: DateRange) -> Result<Out<FetchSummary>> {
    info!(
        "Fetching transactions from {} through {}",
        range.start(),
        range.end()
    );
    let backend = api::backend(config, mode).await?;
    let snapshot = api::fetch_snapshot(backend.as_ref(), range).await?;
    let path = config.snapshot_store().save(&snapshot).await?;

    let summary = FetchSummary {
        path,
        range,
        transactions: snapshot.transactions().len(),
        campaigns: snapshot.campaigns().len(),
        niches: snapshot.niches().len(),
    };
    Ok(Out::new(
        format!(
            "Saved {} transactions, {} campaigns and {} niches to {}",
            summary.transactions,
            summary.campaigns,
            summary.niches,
            summary.path.display()
        ),
        summary,
    ))
}
