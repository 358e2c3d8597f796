//! Implements the `Backend` trait using generated in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a backend server.

use crate::api::Backend;
use crate::model::{Amount, Campaign, DateRange, Niche, Transaction};
use crate::Result;
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

/// An implementation of the `Backend` trait that does not use the network. Transactions are
/// generated for every month of the requested range, so any range has data.
pub(crate) struct TestBackend {
    campaigns: Vec<Campaign>,
    niches: Vec<Niche>,
}

impl TestBackend {
    pub(crate) fn new(campaigns: Vec<Campaign>, niches: Vec<Niche>) -> Self {
        Self { campaigns, niches }
    }
}

impl Default for TestBackend {
    /// Seeds three niches and four campaigns.
    fn default() -> Self {
        Self::new(
            vec![
                Campaign::new(1, "Acme Plumbing", Some(10)),
                Campaign::new(2, "Budget Drains", Some(10)),
                Campaign::new(3, "Peak Roofing", Some(20)),
                Campaign::new(4, "Sunrise Pest Control", Some(30)),
            ],
            vec![
                Niche::new(10, "Plumbing"),
                Niche::new(20, "Roofing"),
                Niche::new(30, "Pest Control"),
            ],
        )
    }
}

#[async_trait::async_trait]
impl Backend for TestBackend {
    async fn transactions(&self, range: DateRange) -> Result<Vec<Transaction>> {
        Ok(generate_transactions(&self.campaigns, range))
    }

    async fn campaigns(&self) -> Result<Vec<Campaign>> {
        Ok(self.campaigns.clone())
    }

    async fn niches(&self) -> Result<Vec<Niche>> {
        Ok(self.niches.clone())
    }
}

/// One payout per campaign per month, one payout per month that has no campaign, and a single
/// record without a timestamp, all with deterministic amounts.
fn generate_transactions(campaigns: &[Campaign], range: DateRange) -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut next_id = 1u64;
    let mut push = |transactions: &mut Vec<Transaction>, t: Transaction| {
        transactions.push(Transaction { id: next_id, ..t });
        next_id += 1;
    };

    let mut month = NaiveDate::from_ymd_opt(range.start().year(), range.start().month(), 1);
    while let Some(first) = month.filter(|m| *m <= range.end()) {
        for (ix, campaign) in campaigns.iter().enumerate() {
            let ix = ix as u32;
            let Some(day) = first.with_day(3 + ix * 6) else {
                continue;
            };
            if day < range.start() || day > range.end() {
                continue;
            }
            let cents = 12_500 + i64::from(first.month()) * 1_075 + i64::from(ix) * 4_210;
            push(
                &mut transactions,
                Transaction::new(
                    0,
                    format!("{} call payout", campaign.name()),
                    campaign.niche_id().unwrap_or_default(),
                    Some(campaign.id()),
                    Amount::new(Decimal::new(cents, 2)),
                    Some(format!("{}T14:30:00Z", day.format("%Y-%m-%d")).as_str()),
                ),
            );
        }
        let unassigned = first
            .with_day(27)
            .filter(|d| *d >= range.start() && *d <= range.end());
        if let Some(day) = unassigned {
            push(
                &mut transactions,
                Transaction::new(
                    0,
                    "Unassigned eLocal payout",
                    20,
                    None,
                    Amount::new(Decimal::new(4_999, 2)),
                    Some(day.format("%Y-%m-%d").to_string().as_str()),
                ),
            );
        }
        month = first.checked_add_months(Months::new(1));
    }

    push(
        &mut transactions,
        Transaction::new(0, "Pending adjustment", 10, Some(1), 15, None),
    );
    transactions
}
