//! Types that represent the backend's data model, such as `Transaction` and `Campaign`.
mod amount;
mod directory;
mod month;
mod transaction;

pub use amount::{Amount, AmountError};
use chrono::{DateTime, Datelike, Local, NaiveDate};
pub use directory::{Campaign, Labels, Niche};
pub use month::{MonthBucket, MONTHS_IN_YEAR, MONTH_NAMES};
use serde::{Deserialize, Serialize};
pub use transaction::Transaction;

/// The inclusive date range a fetch cycle covers. The earnings table is scoped to the year of
/// `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Returns an error if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> crate::Result<Self> {
        anyhow::ensure!(
            start <= end,
            "The date range start {start} is after its end {end}"
        );
        Ok(Self { start, end })
    }

    /// January 1 through December 31 of `year`.
    pub fn calendar_year(year: i32) -> crate::Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = NaiveDate::from_ymd_opt(year, 12, 31);
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => anyhow::bail!("Year {year} is out of range"),
        }
    }

    /// The calendar year containing today's date.
    pub fn this_year() -> crate::Result<Self> {
        Self::calendar_year(Local::now().year())
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }
}

/// Everything one fetch cycle downloads from the backend. A snapshot is never modified after it is
/// fetched; a new date range means a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub(crate) range: DateRange,
    pub(crate) fetched_at: DateTime<Local>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) campaigns: Vec<Campaign>,
    pub(crate) niches: Vec<Niche>,
}

impl Snapshot {
    pub fn new(
        range: DateRange,
        transactions: Vec<Transaction>,
        campaigns: Vec<Campaign>,
        niches: Vec<Niche>,
    ) -> Self {
        Self {
            range,
            fetched_at: Local::now(),
            transactions,
            campaigns,
            niches,
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn fetched_at(&self) -> DateTime<Local> {
        self.fetched_at
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn niches(&self) -> &[Niche] {
        &self.niches
    }

    pub fn labels(&self) -> Labels {
        Labels::new(&self.campaigns, &self.niches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_rejects_reversed() {
        let a = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = DateRange::new(a, b).unwrap_err();
        assert!(err.to_string().contains("is after its end"));
    }

    #[test]
    fn test_date_range_year_follows_start() {
        let start = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(DateRange::new(start, end).unwrap().year(), 2023);
    }

    #[test]
    fn test_calendar_year() {
        let range = DateRange::calendar_year(2024).unwrap();
        assert_eq!(range.start().to_string(), "2024-01-01");
        assert_eq!(range.end().to_string(), "2024-12-31");
    }
}
