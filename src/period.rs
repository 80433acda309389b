// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("Period start {} is after its end {}", start, end);
        }
        Ok(Self { start, end })
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("Invalid month {}-{:02}", year, month))?;
        Ok(Self {
            start,
            end: month_end(year, month)?,
        })
    }

    /// Parse `YYYY-MM`.
    pub fn parse_month(s: &str) -> Result<Self> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
        Self::month(first.year(), first.month())
    }

    /// The calendar month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = month_end(date.year(), date.month()).unwrap_or(date);
        Self { start, end }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

pub fn month_end(year: i32, month: u32) -> Result<NaiveDate> {
    let last_day = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        _ => return Err(anyhow!("Invalid month number {}", month)),
    };
    NaiveDate::from_ymd_opt(year, month, last_day)
        .ok_or_else(|| anyhow!("Invalid month {}-{:02}", year, month))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn month_bounds_handle_leap_years() {
        let p = Period::parse_month("2024-02").unwrap();
        assert_eq!(p.start, d("2024-02-01"));
        assert_eq!(p.end, d("2024-02-29"));
        assert_eq!(Period::month(2025, 2).unwrap().end, d("2025-02-28"));
    }

    #[test]
    fn containing_spans_the_calendar_month() {
        let p = Period::containing(d("2025-04-17"));
        assert_eq!(p.start, d("2025-04-01"));
        assert_eq!(p.end, d("2025-04-30"));
    }

    #[test]
    fn bounds_are_inclusive() {
        let p = Period::new(d("2025-01-01"), d("2025-01-31")).unwrap();
        assert!(p.contains(d("2025-01-01")));
        assert!(p.contains(d("2025-01-31")));
        assert!(!p.contains(d("2025-02-01")));
    }

    #[test]
    fn rejects_reversed_range_and_bad_month() {
        assert!(Period::new(d("2025-02-01"), d("2025-01-01")).is_err());
        assert!(Period::parse_month("2025-13").is_err());
    }
}
