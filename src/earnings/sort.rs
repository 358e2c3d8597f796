//! Ordering of earnings rows by a table column.

use crate::earnings::CampaignNicheRow;
use crate::model::{Amount, Labels};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ENTITY: &str = "entity";
const YEAR_TOTAL: &str = "yearTotal";
const MONTH_PREFIX: &str = "month-";

/// A sortable column of the earnings table.
///
/// Columns are named `entity`, `yearTotal`, or `month-N` where `N` is a month index from 0
/// (January) to 11 (December).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortColumn {
    /// The resolved campaign or niche label.
    Entity,
    /// A single month. `None` means the index in the column name could not be parsed; such a
    /// column, like an out-of-range index, compares every row as zero.
    Month(Option<usize>),
    #[default]
    YearTotal,
}

impl SortColumn {
    fn amount(&self, row: &CampaignNicheRow) -> Amount {
        match self {
            SortColumn::Month(Some(ix)) => row
                .monthly_totals()
                .get(*ix)
                .copied()
                .unwrap_or(Amount::ZERO),
            SortColumn::Month(None) => Amount::ZERO,
            _ => row.year_total(),
        }
    }
}

impl Display for SortColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SortColumn::Entity => f.write_str(ENTITY),
            SortColumn::YearTotal => f.write_str(YEAR_TOTAL),
            SortColumn::Month(Some(ix)) => write!(f, "{MONTH_PREFIX}{ix}"),
            SortColumn::Month(None) => write!(f, "{MONTH_PREFIX}?"),
        }
    }
}

impl FromStr for SortColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ENTITY => Ok(SortColumn::Entity),
            YEAR_TOTAL => Ok(SortColumn::YearTotal),
            _ => match s.strip_prefix(MONTH_PREFIX) {
                Some(ix) => Ok(SortColumn::Month(ix.parse().ok())),
                None => anyhow::bail!(
                    "Invalid sort column '{s}', expected '{ENTITY}', '{YEAR_TOTAL}' or \
                    '{MONTH_PREFIX}N'"
                ),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

serde_plain::derive_display_from_serialize!(SortDirection);
serde_plain::derive_fromstr_from_deserialize!(SortDirection);

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Which column the earnings table is sorted by, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortState {
    column: SortColumn,
    direction: SortDirection,
}

impl SortState {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn column(&self) -> SortColumn {
        self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// The state after the user clicks `column`: the active column flips direction, any other
    /// column becomes active in descending order.
    pub fn toggle(self, column: SortColumn) -> Self {
        if column == self.column {
            Self::new(column, self.direction.reversed())
        } else {
            Self::new(column, SortDirection::Desc)
        }
    }

    /// Returns `rows` ordered by this state. Rows that compare equal keep their relative order.
    pub fn sort(&self, rows: &[CampaignNicheRow], labels: &Labels) -> Vec<CampaignNicheRow> {
        let mut keyed: Vec<(SortKey, &CampaignNicheRow)> = rows
            .iter()
            .map(|row| (self.key(row, labels), row))
            .collect();

        // Vec::sort_by is stable, and reversing the comparator (rather than the output) keeps ties
        // in their original order when descending.
        match self.direction {
            SortDirection::Asc => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
            SortDirection::Desc => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
        }

        keyed.into_iter().map(|(_, row)| row.clone()).collect()
    }

    fn key(&self, row: &CampaignNicheRow, labels: &Labels) -> SortKey {
        match self.column {
            SortColumn::Entity => SortKey::Label(row.label(labels).to_lowercase()),
            _ => SortKey::Amount(self.column.amount(row)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Label(String),
    Amount(Amount),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earnings::RowKey;
    use crate::model::{Campaign, Niche};

    fn row(campaign: Option<u64>, niche: u64, months: &[(usize, i64)]) -> CampaignNicheRow {
        let mut row = CampaignNicheRow::empty(RowKey::new(campaign, niche));
        for (month, amount) in months {
            row.add(*month, Amount::from(*amount));
        }
        row
    }

    fn labels() -> Labels {
        Labels::new(
            &[
                Campaign::new(1, "bravo", Some(10)),
                Campaign::new(2, "Alpha", Some(10)),
            ],
            &[Niche::new(10, "Plumbing"), Niche::new(20, "charlie")],
        )
    }

    fn keys(rows: &[CampaignNicheRow]) -> Vec<String> {
        rows.iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_parse_columns() {
        assert_eq!(SortColumn::from_str("entity").unwrap(), SortColumn::Entity);
        assert_eq!(
            SortColumn::from_str("yearTotal").unwrap(),
            SortColumn::YearTotal
        );
        assert_eq!(
            SortColumn::from_str("month-3").unwrap(),
            SortColumn::Month(Some(3))
        );
        assert_eq!(
            SortColumn::from_str("month-x").unwrap(),
            SortColumn::Month(None)
        );
        assert!(SortColumn::from_str("revenue").is_err());
    }

    #[test]
    fn test_direction_roundtrips_as_plain_text() {
        assert_eq!(SortDirection::Asc.to_string(), "asc");
        assert_eq!(
            SortDirection::from_str("desc").unwrap(),
            SortDirection::Desc
        );
    }

    #[test]
    fn test_year_total_desc() {
        let rows = vec![
            row(Some(2), 10, &[(0, 75)]),
            row(Some(1), 10, &[(0, 100), (1, 50)]),
        ];
        let state = SortState::new(SortColumn::YearTotal, SortDirection::Desc);
        assert_eq!(keys(&state.sort(&rows, &labels())), vec!["1-10", "2-10"]);
    }

    #[test]
    fn test_entity_is_case_insensitive() {
        let rows = vec![
            row(Some(1), 10, &[]),
            row(None, 20, &[]),
            row(Some(2), 10, &[]),
            row(Some(99), 77, &[]),
        ];
        let state = SortState::new(SortColumn::Entity, SortDirection::Asc);
        // "99" < "alpha" < "bravo" < "charlie"
        assert_eq!(
            keys(&state.sort(&rows, &labels())),
            vec!["99-77", "2-10", "1-10", "none-20"]
        );
    }

    #[test]
    fn test_month_column() {
        let rows = vec![
            row(Some(1), 10, &[(3, 5)]),
            row(Some(2), 10, &[(3, 9)]),
            row(Some(3), 10, &[(3, 1)]),
        ];
        let state = SortState::new(SortColumn::Month(Some(3)), SortDirection::Asc);
        assert_eq!(
            keys(&state.sort(&rows, &labels())),
            vec!["3-10", "1-10", "2-10"]
        );
    }

    #[test]
    fn test_bad_month_compares_as_zero() {
        let rows = vec![row(Some(1), 10, &[(0, 5)]), row(Some(2), 10, &[(0, 9)])];
        for column in [SortColumn::Month(Some(12)), SortColumn::Month(None)] {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let sorted = SortState::new(column, direction).sort(&rows, &labels());
                assert_eq!(keys(&sorted), vec!["1-10", "2-10"]);
            }
        }
    }

    #[test]
    fn test_ties_keep_original_order_both_directions() {
        let rows = vec![
            row(Some(1), 10, &[(0, 5)]),
            row(Some(2), 10, &[(0, 7)]),
            row(Some(3), 10, &[(0, 5)]),
            row(Some(4), 10, &[(0, 7)]),
        ];
        let asc = SortState::new(SortColumn::YearTotal, SortDirection::Asc);
        assert_eq!(
            keys(&asc.sort(&rows, &labels())),
            vec!["1-10", "3-10", "2-10", "4-10"]
        );
        let desc = asc.toggle(SortColumn::YearTotal);
        assert_eq!(
            keys(&desc.sort(&rows, &labels())),
            vec!["2-10", "4-10", "1-10", "3-10"]
        );
    }

    #[test]
    fn test_entity_ties_keep_original_order_both_directions() {
        // campaign 1 ("bravo") earns in two niches, so two rows share its label
        let rows = vec![
            row(Some(1), 20, &[(0, 1)]),
            row(Some(2), 10, &[(0, 2)]),
            row(Some(1), 10, &[(0, 3)]),
        ];
        let desc = SortState::new(SortColumn::Entity, SortDirection::Desc);
        assert_eq!(
            keys(&desc.sort(&rows, &labels())),
            vec!["1-20", "1-10", "2-10"]
        );
        let asc = desc.toggle(SortColumn::Entity);
        assert_eq!(
            keys(&asc.sort(&rows, &labels())),
            vec!["2-10", "1-20", "1-10"]
        );
    }

    #[test]
    fn test_toggle_reverses_distinct_values() {
        let rows: Vec<CampaignNicheRow> = [40, 10, 30, 20]
            .iter()
            .enumerate()
            .map(|(i, amount)| row(Some(i as u64), 10, &[(6, *amount)]))
            .collect();
        let asc = SortState::new(SortColumn::Month(Some(6)), SortDirection::Asc);
        let ascending = keys(&asc.sort(&rows, &labels()));
        let mut descending = keys(&asc.toggle(asc.column()).sort(&rows, &labels()));
        descending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn test_resorting_is_stable() {
        let rows = vec![
            row(Some(1), 10, &[(0, 5)]),
            row(Some(2), 10, &[(0, 5)]),
            row(Some(3), 10, &[(0, 1)]),
        ];
        let state = SortState::new(SortColumn::YearTotal, SortDirection::Desc);
        let once = state.sort(&rows, &labels());
        let twice = state.sort(&once, &labels());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let rows = vec![row(Some(1), 10, &[(0, 1)]), row(Some(2), 10, &[(0, 2)])];
        let before = rows.clone();
        let _ = SortState::default().sort(&rows, &labels());
        assert_eq!(rows, before);
    }

    #[test]
    fn test_toggle_rules() {
        let state = SortState::default();
        assert_eq!(state.column(), SortColumn::YearTotal);
        assert_eq!(state.direction(), SortDirection::Desc);

        let state = state.toggle(SortColumn::YearTotal);
        assert_eq!(state.direction(), SortDirection::Asc);

        let state = state.toggle(SortColumn::Entity);
        assert_eq!(state.column(), SortColumn::Entity);
        assert_eq!(state.direction(), SortDirection::Desc);
    }
}
