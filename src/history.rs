use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::app_dirs::AppDirs;
use crate::metrics::Metrics;
use crate::record::ResultRecord;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to prepare history directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("no state directory available for the history database")]
    NoStateDir,
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// Completed session results, persisted in SQLite
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the database at the default state location
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::history_db_path().ok_or(HistoryError::NoStateDir)?;
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                wpm INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                duration_secs INTEGER NOT NULL,
                total_chars INTEGER NOT NULL,
                correct_chars INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_results_completed_at ON results(completed_at)",
            [],
        )?;

        Ok(Self { conn })
    }

    pub fn append(&self, record: &ResultRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO results
            (wpm, accuracy, duration_secs, total_chars, correct_chars, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.wpm(),
                record.accuracy(),
                record.duration_secs(),
                record.total_chars() as i64,
                record.correct_chars() as i64,
                record.completed_at().to_rfc3339(),
            ],
        )?;

        tracing::info!(wpm = record.wpm(), accuracy = record.accuracy(), "saved result");
        Ok(())
    }

    /// Every stored result, oldest first
    pub fn all(&self) -> Result<Vec<ResultRecord>> {
        self.query(
            r#"
            SELECT wpm, accuracy, duration_secs, total_chars, correct_chars, completed_at
            FROM results
            ORDER BY id ASC
            "#,
            [],
        )
    }

    /// The latest `limit` results, oldest first
    pub fn recent(&self, limit: usize) -> Result<Vec<ResultRecord>> {
        let mut records = self.query(
            r#"
            SELECT wpm, accuracy, duration_secs, total_chars, correct_chars, completed_at
            FROM results
            ORDER BY id DESC
            LIMIT ?1
            "#,
            [limit as i64],
        )?;
        records.reverse();
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM results", [])?;
        tracing::info!("cleared result history");
        Ok(())
    }

    /// Write all results as CSV with a header row
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let records = self.all()?;
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &records {
            csv_writer.serialize(CsvRow::from(record))?;
        }
        csv_writer.flush()?;
        Ok(records.len())
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<ResultRecord>> {
        let mut stmt = self.conn.prepare(sql)?;

        let rows = stmt.query_map(params, |row| {
            let completed_at: String = row.get(5)?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Local);

            Ok(ResultRecord::new(
                Metrics {
                    wpm: row.get(0)?,
                    accuracy: row.get(1)?,
                },
                row.get(2)?,
                row.get::<_, i64>(3)? as usize,
                row.get::<_, i64>(4)? as usize,
                completed_at,
            ))
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }
}

#[derive(Serialize)]
struct CsvRow {
    completed_at: String,
    duration_secs: u32,
    wpm: u32,
    accuracy: u32,
    total_chars: usize,
    correct_chars: usize,
}

impl From<&ResultRecord> for CsvRow {
    fn from(r: &ResultRecord) -> Self {
        Self {
            completed_at: r.completed_at().to_rfc3339(),
            duration_secs: r.duration_secs(),
            wpm: r.wpm(),
            accuracy: r.accuracy(),
            total_chars: r.total_chars(),
            correct_chars: r.correct_chars(),
        }
    }
}

/// Aggregates across stored results
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub total_tests: usize,
    pub best_wpm: u32,
    pub avg_wpm: u32,
    pub best_accuracy: u32,
    pub avg_accuracy: u32,
    pub latest: ResultRecord,
}

impl HistorySummary {
    pub fn from_records(records: &[ResultRecord]) -> Option<Self> {
        let latest = records.last()?.clone();

        let count = records.len() as f64;
        let rounded_avg = |total: u64| (total as f64 / count).round() as u32;

        Some(Self {
            total_tests: records.len(),
            best_wpm: records.iter().map(ResultRecord::wpm).max().unwrap_or(0),
            avg_wpm: rounded_avg(records.iter().map(|r| u64::from(r.wpm())).sum()),
            best_accuracy: records.iter().map(ResultRecord::accuracy).max().unwrap_or(0),
            avg_accuracy: rounded_avg(records.iter().map(|r| u64::from(r.accuracy())).sum()),
            latest,
        })
    }
}
