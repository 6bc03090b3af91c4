use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

/// Rate applied to months the table does not list.
pub const DEFAULT_INTEREST_RATE: f64 = 3.0;

/// Weekly price-variation proxy. No data source feeds it yet, so it stays at zero.
pub const WEEKLY_VARIATION_STUB: f64 = 0.0;

/// Base-rate schedule for 2025, keyed by YYYYMM.
const BUILT_IN_RATES: [(u32, f64); 12] = [
    (202501, 3.00),
    (202502, 2.75),
    (202503, 2.75),
    (202504, 2.75),
    (202505, 2.50),
    (202506, 2.50),
    (202507, 2.50),
    (202508, 2.50),
    (202509, 2.50),
    (202510, 2.50),
    (202511, 2.50),
    (202512, 2.50),
];

/// Market signals attached to every feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketContext {
    pub interest_rate: f64,
    pub weekly_variation: f64,
}

/// YYYYMM key for a calendar date.
pub fn year_month(date: NaiveDate) -> u32 {
    date.year() as u32 * 100 + date.month()
}

/// Interest-rate schedule by year-month.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRateTable {
    rates: BTreeMap<u32, f64>,
    default_rate: f64,
}

impl Default for MarketRateTable {
    fn default() -> Self {
        Self::built_in()
    }
}

impl MarketRateTable {
    pub fn built_in() -> Self {
        Self::from_entries(BUILT_IN_RATES)
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, f64)>,
    {
        Self {
            rates: entries.into_iter().collect(),
            default_rate: DEFAULT_INTEREST_RATE,
        }
    }

    /// Loads a `year_month,rate` CSV that replaces the built-in schedule.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, MarketRateError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, MarketRateError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rates = BTreeMap::new();

        for row in csv_reader.deserialize::<RateRow>() {
            let row = row?;
            let month = row.year_month % 100;
            if !(1..=12).contains(&month) || row.year_month < 100_001 {
                return Err(MarketRateError::InvalidYearMonth(row.year_month));
            }
            if !row.rate.is_finite() {
                return Err(MarketRateError::InvalidRate {
                    year_month: row.year_month,
                    rate: row.rate,
                });
            }
            if rates.insert(row.year_month, row.rate).is_some() {
                return Err(MarketRateError::DuplicateMonth(row.year_month));
            }
        }

        Ok(Self {
            rates,
            default_rate: DEFAULT_INTEREST_RATE,
        })
    }

    /// Exact table value, or the default for unlisted months.
    pub fn lookup(&self, year_month: u32) -> f64 {
        self.rates
            .get(&year_month)
            .copied()
            .unwrap_or(self.default_rate)
    }

    pub fn context_for(&self, date: NaiveDate) -> MarketContext {
        MarketContext {
            interest_rate: self.lookup(year_month(date)),
            weekly_variation: WEEKLY_VARIATION_STUB,
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RateRow {
    year_month: u32,
    rate: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum MarketRateError {
    #[error("failed to read market rate file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid market rate CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("year_month {0} is not a YYYYMM value")]
    InvalidYearMonth(u32),
    #[error("rate for {year_month} is not a finite number: {rate}")]
    InvalidRate { year_month: u32, rate: f64 },
    #[error("year_month {0} appears more than once")]
    DuplicateMonth(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn lookup_returns_exact_table_values() {
        let table = MarketRateTable::built_in();
        assert_eq!(table.lookup(202501), 3.00);
        assert_eq!(table.lookup(202503), 2.75);
        assert_eq!(table.lookup(202512), 2.50);
        assert_eq!(table.len(), 12);
    }

    #[test]
    fn lookup_falls_back_to_default_for_unknown_months() {
        let table = MarketRateTable::built_in();
        assert_eq!(table.lookup(202412), DEFAULT_INTEREST_RATE);
        assert_eq!(table.lookup(202601), DEFAULT_INTEREST_RATE);
        assert_eq!(table.lookup(0), DEFAULT_INTEREST_RATE);
    }

    #[test]
    fn context_uses_calendar_month_and_zero_variation() {
        let table = MarketRateTable::built_in();
        let date = NaiveDate::from_ymd_opt(2025, 3, 17).expect("valid date");
        assert_eq!(year_month(date), 202503);

        let context = table.context_for(date);
        assert_eq!(context.interest_rate, 2.75);
        assert_eq!(context.weekly_variation, 0.0);
    }

    #[test]
    fn csv_replaces_built_in_schedule() {
        let csv = "year_month,rate\n202601, 2.25\n202602,2.00\n";
        let table = MarketRateTable::from_csv_reader(Cursor::new(csv)).expect("csv parses");
        assert_eq!(table.lookup(202601), 2.25);
        assert_eq!(table.lookup(202602), 2.00);
        assert_eq!(table.lookup(202503), DEFAULT_INTEREST_RATE);
    }

    #[test]
    fn csv_rejects_bad_months_and_duplicates() {
        let bad_month = "year_month,rate\n202613,2.25\n";
        assert!(matches!(
            MarketRateTable::from_csv_reader(Cursor::new(bad_month)),
            Err(MarketRateError::InvalidYearMonth(202613))
        ));

        let duplicate = "year_month,rate\n202601,2.25\n202601,2.00\n";
        assert!(matches!(
            MarketRateTable::from_csv_reader(Cursor::new(duplicate)),
            Err(MarketRateError::DuplicateMonth(202601))
        ));

        let not_a_number = "year_month,rate\n202601,abc\n";
        assert!(matches!(
            MarketRateTable::from_csv_reader(Cursor::new(not_a_number)),
            Err(MarketRateError::Csv(_))
        ));
    }
}
