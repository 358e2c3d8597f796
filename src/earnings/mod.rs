//! The earnings table: transactions grouped per campaign and niche, with monthly and yearly
//! totals, sorted and paged for display.
//!
//! Everything here is a pure function of an immutable `Snapshot`. When the date range changes, a
//! new snapshot is fetched and the table is rebuilt from scratch.

mod group;
mod sort;
mod totals;

pub use group::group_transactions;
pub use sort::{SortColumn, SortDirection, SortState};
pub use totals::ColumnTotals;

use crate::model::{Amount, Labels, Snapshot, Transaction, MONTHS_IN_YEAR};
use crate::table::{self, Page};
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies an earnings row. Displays as `{campaign_id or "none"}-{niche_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    campaign_id: Option<u64>,
    niche_id: u64,
}

impl RowKey {
    pub fn new(campaign_id: Option<u64>, niche_id: u64) -> Self {
        Self {
            campaign_id,
            niche_id,
        }
    }

    pub fn campaign_id(&self) -> Option<u64> {
        self.campaign_id
    }

    pub fn niche_id(&self) -> u64 {
        self.niche_id
    }
}

impl Display for RowKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.campaign_id {
            Some(id) => write!(f, "{id}-{}", self.niche_id),
            None => write!(f, "none-{}", self.niche_id),
        }
    }
}

/// One `(campaign, niche)` row of the earnings table for a single calendar year.
///
/// `year_total` always equals the sum of `monthly_totals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignNicheRow {
    campaign_id: Option<u64>,
    niche_id: u64,
    monthly_totals: [Amount; MONTHS_IN_YEAR],
    year_total: Amount,
}

impl CampaignNicheRow {
    pub(crate) fn empty(key: RowKey) -> Self {
        Self {
            campaign_id: key.campaign_id,
            niche_id: key.niche_id,
            monthly_totals: [Amount::ZERO; MONTHS_IN_YEAR],
            year_total: Amount::ZERO,
        }
    }

    /// Adds `amount` to month `month` and to the year total. Out-of-range months are ignored.
    pub(crate) fn add(&mut self, month: usize, amount: Amount) {
        if let Some(slot) = self.monthly_totals.get_mut(month) {
            *slot += amount;
            self.year_total += amount;
        }
    }

    pub fn key(&self) -> RowKey {
        RowKey::new(self.campaign_id, self.niche_id)
    }

    pub fn campaign_id(&self) -> Option<u64> {
        self.campaign_id
    }

    pub fn niche_id(&self) -> u64 {
        self.niche_id
    }

    pub fn monthly_totals(&self) -> &[Amount; MONTHS_IN_YEAR] {
        &self.monthly_totals
    }

    pub fn year_total(&self) -> Amount {
        self.year_total
    }

    /// The display label for this row, see `Labels::entity`.
    pub fn label(&self, labels: &Labels) -> String {
        labels.entity(self.campaign_id, self.niche_id)
    }

    /// The fields the earnings search box matches against.
    fn search_fields(&self, labels: &Labels) -> Vec<String> {
        let mut fields = vec![self.label(labels)];
        if let Some(name) = self.campaign_id.and_then(|id| labels.campaign(id)) {
            fields.push(name.to_string());
        }
        if let Some(name) = labels.niche(self.niche_id) {
            fields.push(name.to_string());
        }
        fields
    }
}

/// The grouped rows for one year and their grand totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsTable {
    year: i32,
    rows: Vec<CampaignNicheRow>,
    totals: ColumnTotals,
}

impl EarningsTable {
    /// Groups `transactions` from `year`, bucketing timestamps into months in `tz`.
    pub fn build<Tz: TimeZone>(transactions: &[Transaction], year: i32, tz: &Tz) -> Self {
        let rows = group_transactions(transactions, year, tz);
        let totals = ColumnTotals::from_rows(&rows);
        Self { year, rows, totals }
    }

    /// Builds the table for the year the snapshot's date range starts in.
    pub fn from_snapshot<Tz: TimeZone>(snapshot: &Snapshot, tz: &Tz) -> Self {
        Self::build(snapshot.transactions(), snapshot.range().year(), tz)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Rows in the order their key was first seen.
    pub fn rows(&self) -> &[CampaignNicheRow] {
        &self.rows
    }

    pub fn totals(&self) -> &ColumnTotals {
        &self.totals
    }
}

/// How the earnings table is being looked at: search text, sort, and page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarningsView {
    search: String,
    sort: SortState,
    page: usize,
    page_size: usize,
}

impl Default for EarningsView {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortState::default(),
            page: 1,
            page_size: 25,
        }
    }
}

impl EarningsView {
    pub fn new(search: impl Into<String>, sort: SortState, page: usize, page_size: usize) -> Self {
        Self {
            search: search.into(),
            sort,
            page,
            page_size,
        }
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Filters, then sorts, then pages `table`. The totals row always covers the whole table.
    pub fn apply(&self, table: &EarningsTable, labels: &Labels) -> EarningsPage {
        let matching: Vec<CampaignNicheRow> =
            table::filter_by(table.rows(), &self.search, |row| row.search_fields(labels))
                .into_iter()
                .cloned()
                .collect();
        let sorted = self.sort.sort(&matching, labels);
        let lines: Vec<EarningsLine> = sorted
            .into_iter()
            .map(|row| EarningsLine {
                label: row.label(labels),
                row,
            })
            .collect();

        EarningsPage {
            year: table.year(),
            sort: self.sort.column().to_string(),
            direction: self.sort.direction(),
            page: Page::new(&lines, self.page, self.page_size),
            totals: *table.totals(),
        }
    }
}

/// A row together with its resolved label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsLine {
    label: String,
    #[serde(flatten)]
    row: CampaignNicheRow,
}

impl EarningsLine {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn row(&self) -> &CampaignNicheRow {
        &self.row
    }
}

/// What gets rendered: one page of labelled rows plus the grand-total row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsPage {
    year: i32,
    sort: String,
    direction: SortDirection,
    page: Page<EarningsLine>,
    totals: ColumnTotals,
}

impl EarningsPage {
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The name of the column the rows are sorted by.
    pub fn sort(&self) -> &str {
        &self.sort
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn page(&self) -> &Page<EarningsLine> {
        &self.page
    }

    pub fn totals(&self) -> &ColumnTotals {
        &self.totals
    }
}
