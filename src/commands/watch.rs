use crate::api::{self, Backend, Mode};
use crate::args::WatchArgs;
use crate::commands::report::{describe, earnings_page, render_earnings};
use crate::commands::Out;
use crate::model::Snapshot;
use crate::refresh::{Poller, Refresher};
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// What happened during `earnings watch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchSummary {
    /// Reports printed.
    pub reports: usize,
    /// Fetches that failed. A failed fetch does not stop the watch.
    pub failures: usize,
    pub last_snapshot: Option<PathBuf>,
}

/// Fetches a snapshot every `--interval-secs` and prints its earnings report. A fetch that is still
/// running when the next tick arrives is left to finish rather than restarted.
///
/// Runs until `--count` reports have been printed or the process is interrupted.
pub async fn watch(config: &Config, mode: Mode, args: &WatchArgs) -> Result<Out<WatchSummary>> {
    let backend: Arc<dyn Backend + Send + Sync> = Arc::from(api::backend(config, mode).await?);
    let period = Duration::from_secs(args.interval_secs());
    watch_backend(config, backend, period, args).await
}

async fn watch_backend(
    config: &Config,
    backend: Arc<dyn Backend + Send + Sync>,
    period: Duration,
    args: &WatchArgs,
) -> Result<Out<WatchSummary>> {
    let range = args.range().range()?;
    let store = config.snapshot_store();
    info!(
        "Watching {} through {}, fetching every {}ms",
        range.start(),
        range.end(),
        period.as_millis()
    );

    let mut poller = Poller::start(period);
    let mut refresher: Refresher<Snapshot> = Refresher::new();
    let mut summary = WatchSummary::default();

    loop {
        tokio::select! {
            ticked = poller.tick() => {
                if !ticked {
                    break;
                }
                let backend = Arc::clone(&backend);
                let issued = refresher.issue_if_changed(&range, async move {
                    api::fetch_snapshot(backend.as_ref(), range).await
                });
                if issued.is_none() {
                    debug!("The previous fetch is still running, skipping this tick");
                }
            }
            Some(fresh) = refresher.next_result(), if refresher.has_in_flight() => {
                if !refresher.is_current(fresh.ticket.key()) {
                    debug!("Discarding the result of an outdated request");
                    continue;
                }
                match fresh.value {
                    Ok(snapshot) => {
                        summary.last_snapshot = Some(store.save(&snapshot).await?);
                        let page =
                            earnings_page(&snapshot, args.sort(), args.view(), config.page_size());
                        let rendered = render_earnings(&page, args.view().format())?;
                        Out::new(describe(&page), page).with_output(rendered).print();
                        summary.reports += 1;
                        if args.count().is_some_and(|count| summary.reports >= count) {
                            break;
                        }
                    }
                    Err(e) => {
                        summary.failures += 1;
                        error!("Refresh failed: {e:#}");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
        }
    }
    poller.stop();

    Ok(Out::new(
        format!(
            "Printed {} reports, {} fetches failed",
            summary.reports, summary.failures
        ),
        summary,
    ))
}
