//! SQLite store for fundamentals and daily prices.

use crate::error::{Result, ScreenerError};
use crate::model::{FundamentalsRecord, PricePoint, ScreenerResult};
use crate::query::BuiltQuery;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS fundamentals (
    ticker TEXT PRIMARY KEY,
    pe_ratio REAL,
    roe REAL,
    yoy_profit TEXT,
    yoy_turnover TEXT,
    earnings_outlook TEXT,
    updated_at TEXT,
    dividend_yield REAL,
    dividend_growth_5y REAL,
    intrinsic_value REAL,
    margin_of_safety REAL
);

CREATE TABLE IF NOT EXISTS prices (
    ticker TEXT NOT NULL,
    date TEXT NOT NULL,
    close REAL,
    sma50 REAL,
    sma200 REAL,
    PRIMARY KEY (ticker, date)
);

CREATE INDEX IF NOT EXISTS idx_fundamentals_pe_ratio ON fundamentals(pe_ratio);
CREATE INDEX IF NOT EXISTS idx_fundamentals_roe ON fundamentals(roe);
CREATE INDEX IF NOT EXISTS idx_fundamentals_earnings_outlook ON fundamentals(earnings_outlook);
CREATE INDEX IF NOT EXISTS idx_fundamentals_dividend_yield ON fundamentals(dividend_yield);
CREATE INDEX IF NOT EXISTS idx_fundamentals_margin_of_safety ON fundamentals(margin_of_safety);
CREATE INDEX IF NOT EXISTS idx_prices_ticker_date ON prices(ticker, date DESC);
CREATE INDEX IF NOT EXISTS idx_prices_close ON prices(close);
";

/// `(ticker, pe_ratio, roe, outlook, dividend_yield, dividend_growth_5y, intrinsic_value, margin_of_safety)`
type SampleFundamentals = (&'static str, f64, f64, &'static str, f64, f64, f64, f64);

const SAMPLE_FUNDAMENTALS: [SampleFundamentals; 15] = [
    ("AAPL", 14.5, 0.25, "positive", 0.005, 0.08, 180.50, 0.25),
    ("GOOGL", 13.1, 0.18, "positive", 0.0, 0.0, 3100.0, 0.15),
    ("MSFT", 12.5, 0.22, "positive", 0.035, 0.12, 375.0, 0.22),
    ("TSLA", 45.2, 0.15, "neutral", 0.0, 0.0, 800.0, -0.05),
    ("IBM", 8.3, 0.08, "negative", 0.045, 0.08, 120.0, 0.35),
    ("KO", 9.7, 0.16, "positive", 0.045, 0.08, 65.0, 0.25),
    ("JNJ", 11.2, 0.18, "positive", 0.038, 0.06, 170.0, 0.18),
    ("PFE", 7.8, 0.12, "positive", 0.055, 0.10, 55.0, 0.30),
    ("WMT", 26.5, 0.19, "stable", 0.016, 0.04, 145.0, 0.05),
    ("XOM", 13.8, 0.14, "neutral", 0.058, 0.03, 95.0, 0.12),
    ("JPM", 10.2, 0.16, "positive", 0.025, 0.05, 155.0, 0.18),
    ("DIS", 22.1, 0.08, "neutral", 0.0, 0.0, 110.0, 0.08),
    ("NVDA", 65.3, 0.35, "positive", 0.003, 0.15, 420.0, -0.12),
    ("AMZN", 48.7, 0.12, "positive", 0.0, 0.0, 3200.0, 0.02),
    ("META", 18.9, 0.24, "positive", 0.0, 0.0, 285.0, 0.15),
];

/// `(ticker, close, sma50, sma200)` on [`SAMPLE_DATE`]
const SAMPLE_PRICES: [(&str, f64, f64, f64); 15] = [
    ("AAPL", 150.25, 145.80, 140.30),
    ("GOOGL", 2750.80, 2720.50, 2680.20),
    ("MSFT", 330.59, 325.20, 315.80),
    ("TSLA", 220.45, 235.60, 245.90),
    ("IBM", 78.20, 82.40, 85.10),
    ("KO", 48.75, 52.20, 55.50),
    ("JNJ", 158.30, 162.10, 165.80),
    ("PFE", 42.15, 45.20, 48.90),
    ("WMT", 162.85, 158.40, 155.20),
    ("XOM", 104.25, 98.70, 95.30),
    ("JPM", 168.90, 165.20, 160.50),
    ("DIS", 98.75, 102.30, 105.80),
    ("NVDA", 875.28, 820.50, 750.20),
    ("AMZN", 3087.50, 3120.80, 3200.40),
    ("META", 378.42, 365.20, 350.10),
];

const SAMPLE_DATE: &str = "2024-01-15";

/// The screening dataset.
///
/// Writes are single statements; a ticker's price and fundamentals rows are
/// upserted independently.
#[derive(Debug)]
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path`. Call [`Store::migrate`] before use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database with the schema applied.
    pub fn in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.migrate()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| ScreenerError::LockPoisoned)
    }

    /// Create both tables and their indexes. Safe to run repeatedly.
    pub fn migrate(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        debug!("schema applied");
        Ok(())
    }

    /// Drop both tables. Used to rebuild the database from scratch.
    pub fn reset(&self) -> Result<()> {
        self.conn()?
            .execute_batch("DROP TABLE IF EXISTS prices; DROP TABLE IF EXISTS fundamentals;")?;
        info!("dropped screener tables");
        Ok(())
    }

    /// Load the demonstration universe when `fundamentals` is empty.
    ///
    /// Returns whether rows were inserted.
    pub fn insert_sample_data(&self) -> Result<bool> {
        let existing = self.fundamentals_count()?;
        if existing > 0 {
            info!(existing, "fundamentals already populated, skipping sample data");
            return Ok(false);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO fundamentals
                 (ticker, pe_ratio, roe, earnings_outlook, dividend_yield,
                  dividend_growth_5y, intrinsic_value, margin_of_safety)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (ticker, pe, roe, outlook, dy, dg, iv, mos) in SAMPLE_FUNDAMENTALS {
                stmt.execute(params![ticker, pe, roe, outlook, dy, dg, iv, mos])?;
            }

            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO prices (ticker, date, close, sma50, sma200)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (ticker, close, sma50, sma200) in SAMPLE_PRICES {
                stmt.execute(params![ticker, SAMPLE_DATE, close, sma50, sma200])?;
            }
        }
        tx.commit()?;

        info!(tickers = SAMPLE_FUNDAMENTALS.len(), "inserted sample data");
        Ok(true)
    }

    /// Insert or replace the price row for `(ticker, date)`.
    pub fn upsert_price(&self, point: &PricePoint) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO prices (ticker, date, close, sma50, sma200)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(ticker, date) DO UPDATE SET
                close = excluded.close,
                sma50 = excluded.sma50,
                sma200 = excluded.sma200",
            params![
                point.ticker,
                point.date.to_string(),
                point.close,
                point.sma50,
                point.sma200
            ],
        )?;
        Ok(())
    }

    /// Insert or update the fundamentals row for `record.ticker`.
    ///
    /// Metrics are overwritten. The outlook label and year-over-year blobs keep
    /// their stored value when the record leaves them empty.
    pub fn upsert_fundamentals(&self, record: &FundamentalsRecord) -> Result<()> {
        let yoy_profit = record
            .yoy_profit
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let yoy_turnover = record
            .yoy_turnover
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let updated_at = record.updated_at.unwrap_or_else(Utc::now).to_rfc3339();

        self.conn()?.execute(
            "INSERT INTO fundamentals
             (ticker, pe_ratio, roe, yoy_profit, yoy_turnover, earnings_outlook, updated_at,
              dividend_yield, dividend_growth_5y, intrinsic_value, margin_of_safety)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(ticker) DO UPDATE SET
                pe_ratio = excluded.pe_ratio,
                roe = excluded.roe,
                yoy_profit = COALESCE(excluded.yoy_profit, fundamentals.yoy_profit),
                yoy_turnover = COALESCE(excluded.yoy_turnover, fundamentals.yoy_turnover),
                earnings_outlook = COALESCE(excluded.earnings_outlook, fundamentals.earnings_outlook),
                updated_at = excluded.updated_at,
                dividend_yield = excluded.dividend_yield,
                dividend_growth_5y = excluded.dividend_growth_5y,
                intrinsic_value = excluded.intrinsic_value,
                margin_of_safety = excluded.margin_of_safety",
            params![
                record.ticker,
                record.pe_ratio,
                record.roe,
                yoy_profit,
                yoy_turnover,
                record.earnings_outlook,
                updated_at,
                record.dividend_yield,
                record.dividend_growth_5y,
                record.intrinsic_value,
                record.margin_of_safety,
            ],
        )?;
        Ok(())
    }

    /// Run a built screening query.
    pub fn screen(&self, query: &BuiltQuery) -> Result<Vec<ScreenerResult>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt.query_map(params_from_iter(query.params.iter()), ScreenerResult::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Number of fundamentals rows.
    pub fn fundamentals_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM fundamentals", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// The fundamentals row for `ticker`, if any.
    pub fn fundamentals(&self, ticker: &str) -> Result<Option<FundamentalsRecord>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT ticker, pe_ratio, roe, yoy_profit, yoy_turnover, earnings_outlook,
                        updated_at, dividend_yield, dividend_growth_5y, intrinsic_value,
                        margin_of_safety
                 FROM fundamentals WHERE ticker = ?1",
                params![ticker],
                |row| {
                    Ok((
                        FundamentalsRecord {
                            ticker: row.get(0)?,
                            pe_ratio: row.get(1)?,
                            roe: row.get(2)?,
                            yoy_profit: None,
                            yoy_turnover: None,
                            earnings_outlook: row.get(5)?,
                            updated_at: row
                                .get::<_, Option<String>>(6)?
                                .as_deref()
                                .and_then(parse_timestamp),
                            dividend_yield: row.get(7)?,
                            dividend_growth_5y: row.get(8)?,
                            intrinsic_value: row.get(9)?,
                            margin_of_safety: row.get(10)?,
                        },
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((mut record, yoy_profit, yoy_turnover)) = row else {
            return Ok(None);
        };
        record.yoy_profit = yoy_profit
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        record.yoy_turnover = yoy_turnover
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        Ok(Some(record))
    }

    /// Every price row for `ticker`, oldest first.
    pub fn prices(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT ticker, date, close, sma50, sma200
             FROM prices WHERE ticker = ?1 ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![ticker], |row| {
            let date: String = row.get(1)?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
            })?;
            Ok(PricePoint {
                ticker: row.get(0)?,
                date,
                close: row.get(2)?,
                sma50: row.get(3)?,
                sma200: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// RFC 3339, or SQLite's `datetime('now')` format.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(ticker: &str, date: &str, close: f64) -> PricePoint {
        PricePoint {
            ticker: ticker.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            close,
            sma50: close * 0.98,
            sma200: close * 0.95,
        }
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let store = Store::in_memory().unwrap();
        store.migrate().unwrap();
        store.migrate().unwrap();
        assert_eq!(store.fundamentals_count().unwrap(), 0);
    }

    #[test]
    fn test_sample_data_only_when_empty() {
        let store = Store::in_memory().unwrap();
        assert!(store.insert_sample_data().unwrap());
        assert_eq!(store.fundamentals_count().unwrap(), 15);
        assert!(!store.insert_sample_data().unwrap());
        assert_eq!(store.prices("AAPL").unwrap().len(), 1);
    }

    #[test]
    fn test_price_upsert_replaces_same_date() {
        let store = Store::in_memory().unwrap();
        store.upsert_price(&point("KO", "2024-03-01", 59.0)).unwrap();
        store.upsert_price(&point("KO", "2024-03-01", 60.0)).unwrap();
        store.upsert_price(&point("KO", "2024-03-04", 61.0)).unwrap();

        let prices = store.prices("KO").unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].close, 60.0);
        assert_eq!(prices[1].close, 61.0);
    }

    #[test]
    fn test_fundamentals_upsert_round_trip() {
        let store = Store::in_memory().unwrap();
        let mut record = FundamentalsRecord::new("MSFT");
        record.pe_ratio = Some(32.1);
        record.roe = Some(0.38);
        record.earnings_outlook = Some("positive".to_string());
        record.yoy_profit = Some(json!({"period": "2023-06-30", "change": 0.0}));
        store.upsert_fundamentals(&record).unwrap();

        let mut update = FundamentalsRecord::new("MSFT");
        update.pe_ratio = Some(30.0);
        store.upsert_fundamentals(&update).unwrap();

        let stored = store.fundamentals("MSFT").unwrap().unwrap();
        assert_eq!(stored.pe_ratio, Some(30.0));
        assert_eq!(stored.roe, None);
        assert_eq!(stored.earnings_outlook.as_deref(), Some("positive"));
        assert_eq!(stored.yoy_profit, record.yoy_profit);
        assert!(stored.updated_at.is_some());
        assert_eq!(store.fundamentals_count().unwrap(), 1);
    }

    #[test]
    fn test_missing_ticker() {
        let store = Store::in_memory().unwrap();
        assert!(store.fundamentals("NOPE").unwrap().is_none());
        assert!(store.prices("NOPE").unwrap().is_empty());
    }

    #[test]
    fn test_reset_then_migrate() {
        let store = Store::in_memory().unwrap();
        store.insert_sample_data().unwrap();
        store.reset().unwrap();
        store.migrate().unwrap();
        assert_eq!(store.fundamentals_count().unwrap(), 0);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15T22:00:00+00:00").is_some());
        assert!(parse_timestamp("2024-01-15 22:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
