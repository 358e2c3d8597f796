use crate::earnings::CampaignNicheRow;
use crate::model::{Amount, MONTHS_IN_YEAR};
use serde::{Deserialize, Serialize};

/// The grand-total row of an earnings table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTotals {
    monthly_grand_totals: [Amount; MONTHS_IN_YEAR],
    grand_total: Amount,
}

impl ColumnTotals {
    /// Sums `rows` column by column. Rows are the outer loop and months the inner loop.
    pub fn from_rows(rows: &[CampaignNicheRow]) -> Self {
        let mut totals = Self::default();
        for row in rows {
            for (slot, amount) in totals
                .monthly_grand_totals
                .iter_mut()
                .zip(row.monthly_totals())
            {
                *slot += *amount;
            }
            totals.grand_total += row.year_total();
        }
        totals
    }

    pub fn monthly_grand_totals(&self) -> &[Amount; MONTHS_IN_YEAR] {
        &self.monthly_grand_totals
    }

    pub fn grand_total(&self) -> Amount {
        self.grand_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earnings::{group_transactions, RowKey};
    use crate::model::Transaction;
    use chrono::Utc;

    #[test]
    fn test_example_totals() {
        let transactions = vec![
            Transaction::new(1, "", 10, Some(1), 100, Some("2024-01-15")),
            Transaction::new(2, "", 10, Some(1), 50, Some("2024-02-01")),
            Transaction::new(3, "", 10, Some(2), 75, Some("2024-01-20")),
        ];
        let rows = group_transactions(&transactions, 2024, &Utc);
        let totals = ColumnTotals::from_rows(&rows);
        assert_eq!(totals.monthly_grand_totals()[0], Amount::from(175));
        assert_eq!(totals.monthly_grand_totals()[1], Amount::from(50));
        assert!(totals.monthly_grand_totals()[2..]
            .iter()
            .all(Amount::is_zero));
        assert_eq!(totals.grand_total(), Amount::from(225));
    }

    #[test]
    fn test_empty_rows() {
        let totals = ColumnTotals::from_rows(&[]);
        assert_eq!(totals, ColumnTotals::default());
        assert!(totals.grand_total().is_zero());
    }

    #[test]
    fn test_grand_total_matches_both_sums() {
        let mut rows = Vec::new();
        for i in 0..5u64 {
            let mut row = CampaignNicheRow::empty(RowKey::new(Some(i), 1));
            for month in 0..MONTHS_IN_YEAR {
                let cents = (i as i64 * 37 + month as i64 * 11) % 97 - 20;
                row.add(month, Amount::new(rust_decimal::Decimal::new(cents, 2)));
            }
            rows.push(row);
        }
        let totals = ColumnTotals::from_rows(&rows);
        let by_rows: Amount = rows.iter().map(|r| r.year_total()).sum();
        let by_months: Amount = totals.monthly_grand_totals().iter().sum();
        assert_eq!(totals.grand_total(), by_rows);
        assert_eq!(totals.grand_total(), by_months);
    }
}
