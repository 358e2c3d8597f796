//! Groups transactions into one row per `(campaign, niche)` with monthly totals.

use crate::earnings::{CampaignNicheRow, RowKey};
use crate::model::{Transaction, MONTHS_IN_YEAR};
use chrono::TimeZone;
use std::collections::HashMap;
use tracing::trace;

/// Groups `transactions` created in `year` into rows keyed by `(campaign_id, niche_id)`.
///
/// Transactions without a `created_at`, with one that does not parse, or from another year are
/// skipped. Rows are returned in the order their key was first seen.
pub fn group_transactions<Tz: TimeZone>(
    transactions: &[Transaction],
    year: i32,
    tz: &Tz,
) -> Vec<CampaignNicheRow> {
    let mut rows: Vec<CampaignNicheRow> = Vec::new();
    let mut index: HashMap<RowKey, usize> = HashMap::new();

    for transaction in transactions {
        let Some(bucket) = transaction.month_in(tz) else {
            trace!(
                "Skipping transaction {} with unusable created_at {:?}",
                transaction.id(),
                transaction.created_at()
            );
            continue;
        };
        if bucket.year() != year {
            continue;
        }
        let month = bucket.month_index();
        if month >= MONTHS_IN_YEAR {
            continue;
        }

        let key = RowKey::new(transaction.campaign_id(), transaction.niche_id());
        let ix = *index.entry(key).or_insert_with(|| {
            rows.push(CampaignNicheRow::empty(key));
            rows.len() - 1
        });
        rows[ix].add(month, transaction.amount());
    }

    rows
}
