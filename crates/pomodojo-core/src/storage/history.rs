//! Per-day session history.
//!
//! Every completed session is merged into the record of the local day it
//! started on, so a day has at most one row. Yearly summaries are computed
//! over UTC year boundaries.

use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::Database;
use crate::error::Result;
use crate::timer::CompletionSummary;

/// One history row: the totals of every session started on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date_started_epoch_ms: u64,
    pub date_finished_epoch_ms: u64,
    pub total_focus_minutes: u64,
    pub total_break_minutes: u64,
    pub completed_cycles: u32,
}

impl HistoryRecord {
    pub fn from_summary(summary: &CompletionSummary, started_ms: u64, finished_ms: u64) -> Self {
        Self {
            date_started_epoch_ms: started_ms,
            date_finished_epoch_ms: finished_ms.max(started_ms),
            total_focus_minutes: summary.total_focus_minutes,
            total_break_minutes: summary.total_break_minutes,
            completed_cycles: summary.completed_cycles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyHistory {
    pub date: NaiveDate,
    pub focus_minutes: u64,
    pub break_minutes: u64,
    pub completed_cycles: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub year: i32,
    pub focus_minutes_this_year: u64,
    /// Years with at least one record, newest first.
    pub available_years: Vec<i32>,
    pub days: Vec<DailyHistory>,
}

/// Sink for finished sessions.
pub trait HistoryStore {
    /// Merge `record` into the history of the day it started on.
    ///
    /// # Errors
    /// Returns an error if the record cannot be stored.
    fn record_session(&self, record: &HistoryRecord) -> Result<()>;
}

impl<T: HistoryStore + ?Sized> HistoryStore for &T {
    fn record_session(&self, record: &HistoryRecord) -> Result<()> {
        (**self).record_session(record)
    }
}

impl HistoryStore for Database {
    fn record_session(&self, record: &HistoryRecord) -> Result<()> {
        self.insert_history(record).map(|_| ())
    }
}

/// In-memory [`HistoryStore`] that keeps every record as received.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn record_session(&self, record: &HistoryRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
        Ok(())
    }
}

impl Database {
    /// Merge a record into the history of its local start day.
    ///
    /// Returns the merged row.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub fn insert_history(&self, record: &HistoryRecord) -> Result<HistoryRecord> {
        self.insert_history_in(record, &Local)
    }

    /// [`Database::insert_history`] with days cut in `tz`.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub fn insert_history_in<Tz: TimeZone>(
        &self,
        record: &HistoryRecord,
        tz: &Tz,
    ) -> Result<HistoryRecord> {
        let day = day_of(tz, record.date_started_epoch_ms);
        let (start, end) = day_bounds(tz, day);

        let tx = self.conn().unchecked_transaction()?;
        let (min_start, max_finish, focus, brk, cycles): (Option<i64>, Option<i64>, i64, i64, i64) =
            tx.query_row(
                "SELECT MIN(date_started), MAX(date_finished),
                        COALESCE(SUM(total_focus_minutes), 0),
                        COALESCE(SUM(total_break_minutes), 0),
                        COALESCE(SUM(completed_cycles), 0)
                 FROM history_sessions
                 WHERE date_started >= ?1 AND date_started < ?2",
                params![start, end],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )?;

        let merged = HistoryRecord {
            date_started_epoch_ms: min_start
                .map_or(record.date_started_epoch_ms, |s| {
                    from_sql_ms(s).min(record.date_started_epoch_ms)
                }),
            date_finished_epoch_ms: max_finish
                .map_or(record.date_finished_epoch_ms, |f| {
                    from_sql_ms(f).max(record.date_finished_epoch_ms)
                }),
            total_focus_minutes: record.total_focus_minutes + from_sql_ms(focus),
            total_break_minutes: record.total_break_minutes + from_sql_ms(brk),
            completed_cycles: record
                .completed_cycles
                .saturating_add(u32::try_from(cycles).unwrap_or(0)),
        };

        tx.execute(
            "DELETE FROM history_sessions WHERE date_started >= ?1 AND date_started < ?2",
            params![start, end],
        )?;
        tx.execute(
            "INSERT INTO history_sessions
                (date_started, date_finished, total_focus_minutes, total_break_minutes, completed_cycles)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                to_sql_ms(merged.date_started_epoch_ms),
                to_sql_ms(merged.date_finished_epoch_ms),
                to_sql_ms(merged.total_focus_minutes),
                to_sql_ms(merged.total_break_minutes),
                merged.completed_cycles,
            ],
        )?;
        tx.commit()?;

        tracing::debug!(%day, focus = merged.total_focus_minutes, "history merged");
        Ok(merged)
    }

    /// Totals for the current local day, if anything was recorded.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn history_today(&self) -> Result<Option<DailyHistory>> {
        self.history_for_day_in(&Local, Local::now().date_naive())
    }

    /// Totals for `day` as cut in `tz`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn history_for_day_in<Tz: TimeZone>(
        &self,
        tz: &Tz,
        day: NaiveDate,
    ) -> Result<Option<DailyHistory>> {
        let (start, end) = day_bounds(tz, day);
        let days = self.daily_rows(tz, start, end)?;
        Ok(days.into_iter().find(|d| d.date == day))
    }

    /// Years with at least one record (UTC), newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn available_years(&self) -> Result<Vec<i32>> {
        let mut stmt = self.conn().prepare(
            "SELECT DISTINCT CAST(strftime('%Y', date_started / 1000, 'unixepoch') AS INTEGER) AS y
             FROM history_sessions
             ORDER BY y DESC",
        )?;
        let years = stmt
            .query_map([], |row| row.get::<_, i32>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(years)
    }

    /// Yearly summary with days cut in the local time zone.
    ///
    /// # Errors
    /// Returns an error if a query fails.
    pub fn history_for_year(&self, year: i32) -> Result<HistorySummary> {
        self.history_for_year_in(year, &Local)
    }

    /// Yearly summary over the UTC year `year`, with days cut in `tz`.
    ///
    /// # Errors
    /// Returns an error if a query fails.
    pub fn history_for_year_in<Tz: TimeZone>(&self, year: i32, tz: &Tz) -> Result<HistorySummary> {
        let start = utc_year_start(year);
        let end = utc_year_start(year.saturating_add(1));
        let days = self.daily_rows(tz, start, end)?;
        Ok(HistorySummary {
            year,
            focus_minutes_this_year: days.iter().map(|d| d.focus_minutes).sum(),
            available_years: self.available_years()?,
            days,
        })
    }

    fn daily_rows<Tz: TimeZone>(&self, tz: &Tz, start: i64, end: i64) -> Result<Vec<DailyHistory>> {
        let mut stmt = self.conn().prepare(
            "SELECT date_started, total_focus_minutes, total_break_minutes, completed_cycles
             FROM history_sessions
             WHERE date_started >= ?1 AND date_started < ?2
             ORDER BY date_started ASC",
        )?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut days: Vec<DailyHistory> = Vec::new();
        for (started, focus, brk, cycles) in rows {
            let date = day_of(tz, from_sql_ms(started));
            let cycles = u32::try_from(cycles).unwrap_or(0);
            match days.last_mut() {
                Some(last) if last.date == date => {
                    last.focus_minutes += from_sql_ms(focus);
                    last.break_minutes += from_sql_ms(brk);
                    last.completed_cycles = last.completed_cycles.saturating_add(cycles);
                }
                _ => days.push(DailyHistory {
                    date,
                    focus_minutes: from_sql_ms(focus),
                    break_minutes: from_sql_ms(brk),
                    completed_cycles: cycles,
                }),
            }
        }
        Ok(days)
    }
}

fn to_sql_ms(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_ms(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn day_of<Tz: TimeZone>(tz: &Tz, epoch_ms: u64) -> NaiveDate {
    tz.timestamp_millis_opt(to_sql_ms(epoch_ms))
        .single()
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

/// `[start, end)` of `day` in `tz`, as epoch milliseconds.
fn day_bounds<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> (i64, i64) {
    let start = midnight(tz, day);
    let end = day.succ_opt().map_or(i64::MAX, |next| midnight(tz, next));
    (start, end)
}

fn midnight<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> i64 {
    let naive = day.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| naive.and_utc().timestamp_millis(), |dt| dt.timestamp_millis())
}

fn utc_year_start(year: i32) -> i64 {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .map_or(i64::MAX, |dt| dt.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc_ms(y: i32, m: u32, d: u32, h: u32) -> u64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .timestamp_millis() as u64
    }

    fn record(start: u64, focus: u64, brk: u64, cycles: u32) -> HistoryRecord {
        HistoryRecord {
            date_started_epoch_ms: start,
            date_finished_epoch_ms: start + (focus + brk) * 60_000,
            total_focus_minutes: focus,
            total_break_minutes: brk,
            completed_cycles: cycles,
        }
    }

    #[test]
    fn same_day_records_merge_into_one_row() {
        let db = Database::open_memory().unwrap();
        db.insert_history_in(&record(utc_ms(2026, 3, 4, 9), 50, 5, 2), &Utc)
            .unwrap();
        let merged = db
            .insert_history_in(&record(utc_ms(2026, 3, 4, 15), 25, 0, 1), &Utc)
            .unwrap();

        assert_eq!(merged.date_started_epoch_ms, utc_ms(2026, 3, 4, 9));
        assert_eq!(merged.total_focus_minutes, 75);
        assert_eq!(merged.total_break_minutes, 5);
        assert_eq!(merged.completed_cycles, 3);

        let rows: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM history_sessions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn different_days_stay_separate() {
        let db = Database::open_memory().unwrap();
        db.insert_history_in(&record(utc_ms(2026, 3, 4, 9), 25, 0, 1), &Utc)
            .unwrap();
        db.insert_history_in(&record(utc_ms(2026, 3, 5, 9), 50, 5, 2), &Utc)
            .unwrap();

        let day = db
            .history_for_day_in(&Utc, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(day.focus_minutes, 50);
        assert!(db
            .history_for_day_in(&Utc, NaiveDate::from_ymd_opt(2026, 3, 6).unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn day_boundary_follows_time_zone() {
        let db = Database::open_memory().unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2026-03-04 20:00 UTC and 2026-03-05 01:00 UTC are both March 5th in Tokyo.
        db.insert_history_in(&record(utc_ms(2026, 3, 4, 20), 25, 5, 1), &tokyo)
            .unwrap();
        db.insert_history_in(&record(utc_ms(2026, 3, 5, 1), 25, 5, 1), &tokyo)
            .unwrap();

        let day = db
            .history_for_day_in(&tokyo, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(day.focus_minutes, 50);
        assert_eq!(day.completed_cycles, 2);
    }

    #[test]
    fn yearly_summary_and_available_years() {
        let db = Database::open_memory().unwrap();
        db.insert_history_in(&record(utc_ms(2025, 12, 31, 10), 100, 10, 4), &Utc)
            .unwrap();
        db.insert_history_in(&record(utc_ms(2026, 1, 2, 10), 25, 0, 1), &Utc)
            .unwrap();
        db.insert_history_in(&record(utc_ms(2026, 2, 2, 10), 50, 5, 2), &Utc)
            .unwrap();

        let summary = db.history_for_year_in(2026, &Utc).unwrap();
        assert_eq!(summary.focus_minutes_this_year, 75);
        assert_eq!(summary.days.len(), 2);
        assert_eq!(summary.available_years, vec![2026, 2025]);

        let empty = db.history_for_year_in(2020, &Utc).unwrap();
        assert!(empty.days.is_empty());
        assert_eq!(empty.focus_minutes_this_year, 0);
    }

    #[test]
    fn record_from_summary() {
        let summary = CompletionSummary {
            session_id: "1000".into(),
            total_focus_minutes: 50,
            total_break_minutes: 5,
            completed_cycles: 2,
        };
        let r = HistoryRecord::from_summary(&summary, 1_000, 500);
        assert_eq!(r.date_finished_epoch_ms, 1_000);
        assert_eq!(r.total_focus_minutes, 50);
        assert_eq!(r.completed_cycles, 2);
    }

    #[test]
    fn memory_store_keeps_records() {
        let store = MemoryHistoryStore::new();
        (&store).record_session(&record(0, 25, 0, 1)).unwrap();
        assert_eq!(store.records().len(), 1);
    }
}
