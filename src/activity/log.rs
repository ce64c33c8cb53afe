use std::{ops::Deref, path::Path};

use anyhow::{anyhow, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::utils::time::MS_PER_DAY;

/// Half-open millisecond window `[start_ms, end_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl DayWindow {
    /// Window covering the epoch days `first_day..=last_day`.
    pub fn from_epoch_days(first_day: i64, last_day: i64) -> Self {
        Self {
            start_ms: first_day * MS_PER_DAY,
            end_ms: (last_day + 1) * MS_PER_DAY,
        }
    }
}

/// Number of events that fell into one epoch day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount {
    pub epoch_day: i64,
    pub count: u64,
}

/// Read-only view of the host's activity log.
#[cfg_attr(test, automock)]
pub trait ActivityLog {
    /// Counts events in `window`, grouped by `floor(timestamp_ms / 86_400_000)`. Errors when the
    /// log isn't available.
    fn count_by_day(&self, window: DayWindow) -> Result<Vec<DayCount>>;
}

impl<T: Deref> ActivityLog for T
where
    T::Target: ActivityLog,
{
    fn count_by_day(&self, window: DayWindow) -> Result<Vec<DayCount>> {
        self.deref().count_by_day(window)
    }
}

/// Table holding one row per logged action, keyed by a millisecond timestamp.
#[derive(Debug, Clone, Copy)]
pub struct LogTable {
    pub table: &'static str,
    pub timestamp_column: &'static str,
}

/// The host's review log: the row id is the review time in milliseconds.
pub const REVIEW_LOG: LogTable = LogTable {
    table: "revlog",
    timestamp_column: "id",
};

/// [ActivityLog] over the host's sqlite collection. The connection is absent while the host has
/// no collection open.
pub struct SqliteActivityLog {
    conn: Option<Connection>,
    table: LogTable,
}

impl SqliteActivityLog {
    pub fn new(conn: Connection, table: LogTable) -> Self {
        Self {
            conn: Some(conn),
            table,
        }
    }

    /// Log that isn't backed by any collection yet.
    pub fn detached(table: LogTable) -> Self {
        Self { conn: None, table }
    }

    /// Opens the collection read-only.
    pub fn open(path: &Path, table: LogTable) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::new(conn, table))
    }

    pub fn attach(&mut self, conn: Connection) {
        self.conn = Some(conn);
    }

    pub fn detach(&mut self) -> Option<Connection> {
        self.conn.take()
    }
}

impl ActivityLog for SqliteActivityLog {
    fn count_by_day(&self, window: DayWindow) -> Result<Vec<DayCount>> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| anyhow!("Activity log is not open"))?;

        let LogTable {
            table,
            timestamp_column,
        } = self.table;
        // Integer division truncates toward zero in sqlite; timestamps are never negative here.
        let sql = format!(
            "SELECT {timestamp_column} / {MS_PER_DAY} AS day, COUNT(*) FROM {table} \
             WHERE {timestamp_column} >= ?1 AND {timestamp_column} < ?2 GROUP BY day"
        );
        debug!("Counting activity in {window:?}");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map((window.start_ms, window.end_ms), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (epoch_day, count) = row?;
            out.push(DayCount {
                epoch_day,
                count: u64::try_from(count).unwrap_or(0),
            });
        }
        Ok(out)
    }
}
