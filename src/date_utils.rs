use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::ReportError;

/// Trait for request params that carry a report window, either as a symbolic
/// selector or as explicit calendar bounds.
#[allow(clippy::wrong_self_convention)]
pub trait WindowFilterable {
    fn window(&self) -> Option<&String>;
    fn year(&self) -> Option<i32>;
    fn quarter(&self) -> Option<u32>;
    fn from_date(&self) -> Option<&String>;
    fn to_date(&self) -> Option<&String>;

    /// Resolution order: `window`, then `year`/`quarter`, then `from`/`to`.
    /// With nothing given the whole ledger is reported.
    fn resolve_selector(&self) -> Result<WindowSelector, ReportError> {
        if let Some(window) = self.window() {
            return window.parse();
        }

        if let Some(year) = self.year() {
            return Ok(match self.quarter() {
                Some(quarter) => WindowSelector::CalendarQuarter { year, quarter },
                None => WindowSelector::CalendarYear(year),
            });
        }
        if let Some(quarter) = self.quarter() {
            return Err(ReportError::InvalidWindowSelector(format!(
                "quarter {} without a year",
                quarter
            )));
        }

        match (self.from_date(), self.to_date()) {
            (Some(from), Some(to)) => Ok(WindowSelector::Range {
                from: parse_bound(from)?,
                to: parse_bound(to)?,
            }),
            (None, None) => Ok(WindowSelector::All),
            _ => Err(ReportError::InvalidWindowSelector(
                "both from and to are required for an explicit range".into(),
            )),
        }
    }
}

fn parse_bound(s: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidWindowSelector(format!("invalid date '{}'", s)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSelector {
    /// Rolling month ending now.
    Month,
    /// Rolling three months ending now.
    Quarter,
    /// Rolling twelve months ending now.
    Year,
    All,
    CalendarYear(i32),
    CalendarQuarter { year: i32, quarter: u32 },
    /// Inclusive calendar dates.
    Range { from: NaiveDate, to: NaiveDate },
}

impl FromStr for WindowSelector {
    type Err = ReportError;

    /// Accepts `month`, `quarter`, `year`, `all`, a bare year (`2025`), a
    /// year and quarter (`2025-Q2`) or an inclusive range
    /// (`2025-01-01..2025-03-31`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReportError::InvalidWindowSelector(s.to_string());
        let trimmed = s.trim();

        match trimmed.to_lowercase().as_str() {
            "month" => return Ok(Self::Month),
            "quarter" => return Ok(Self::Quarter),
            "year" => return Ok(Self::Year),
            "all" => return Ok(Self::All),
            _ => {}
        }

        if let Some((from, to)) = trimmed.split_once("..") {
            return Ok(Self::Range {
                from: parse_bound(from)?,
                to: parse_bound(to)?,
            });
        }

        if let Some((year, quarter)) = trimmed.split_once(['-', ' ']) {
            let quarter = quarter
                .strip_prefix(['Q', 'q'])
                .ok_or_else(invalid)?
                .parse::<u32>()
                .map_err(|_| invalid())?;
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            return Ok(Self::CalendarQuarter { year, quarter });
        }

        trimmed
            .parse::<i32>()
            .map(Self::CalendarYear)
            .map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowLabel {
    Month,
    Quarter,
    Year,
    All,
    CalendarYear,
    CalendarQuarter,
    Custom,
}

/// Half-open `[start, end)` interval a report is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub label: WindowLabel,
}

impl TimeWindow {
    pub fn resolve(selector: WindowSelector, now: NaiveDateTime) -> Result<Self, ReportError> {
        let rolling = |months: u32, label: WindowLabel| Self {
            start: now
                .checked_sub_months(Months::new(months))
                .unwrap_or(NaiveDateTime::MIN),
            end: now,
            label,
        };

        let window = match selector {
            WindowSelector::Month => rolling(1, WindowLabel::Month),
            WindowSelector::Quarter => rolling(3, WindowLabel::Quarter),
            WindowSelector::Year => rolling(12, WindowLabel::Year),
            WindowSelector::All => Self {
                start: NaiveDateTime::MIN,
                end: now,
                label: WindowLabel::All,
            },
            WindowSelector::CalendarYear(year) => {
                let start = ymd(year, 1, 1)?;
                Self {
                    start: midnight(start),
                    end: midnight(shift_months(start, 12)?),
                    label: WindowLabel::CalendarYear,
                }
            }
            WindowSelector::CalendarQuarter { year, quarter } => {
                if !(1..=4).contains(&quarter) {
                    return Err(ReportError::InvalidWindowSelector(format!(
                        "quarter {} is outside 1-4",
                        quarter
                    )));
                }
                let start = ymd(year, (quarter - 1) * 3 + 1, 1)?;
                Self {
                    start: midnight(start),
                    end: midnight(shift_months(start, 3)?),
                    label: WindowLabel::CalendarQuarter,
                }
            }
            WindowSelector::Range { from, to } => {
                if from > to {
                    return Err(ReportError::InvalidWindowSelector(format!(
                        "range starts after it ends ({} > {})",
                        from, to
                    )));
                }
                let end = to.succ_opt().ok_or_else(|| {
                    ReportError::InvalidWindowSelector(format!("date {} out of range", to))
                })?;
                Self {
                    start: midnight(from),
                    end: midnight(end),
                    label: WindowLabel::Custom,
                }
            }
        };

        if window.start >= window.end {
            return Err(ReportError::InvalidWindowSelector(format!(
                "empty window ending {}",
                window.end
            )));
        }
        Ok(window)
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.start == NaiveDateTime::MIN
    }

    /// First day of every calendar month overlapping the window, oldest first.
    /// `floor` raises an unbounded start to a concrete instant.
    pub fn month_starts(&self, floor: Option<NaiveDateTime>) -> Vec<NaiveDate> {
        let start = match floor {
            Some(f) if f > self.start => f,
            _ => self.start,
        };
        if start >= self.end {
            return Vec::new();
        }

        let last = (self.end - Duration::nanoseconds(1)).date();
        let mut cursor = month_start(start.date());
        let mut months = Vec::new();
        while cursor <= last {
            months.push(cursor);
            match cursor.checked_add_months(Months::new(1)) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        months
    }

    /// Human-readable label, e.g. "Last 3 Months", "Q1 2026", "2025",
    /// "All Time", or "Jan 1 – Mar 15, 2026".
    pub fn display_label(&self) -> String {
        match self.label {
            WindowLabel::Month => "Last Month".to_string(),
            WindowLabel::Quarter => "Last 3 Months".to_string(),
            WindowLabel::Year => "Last 12 Months".to_string(),
            WindowLabel::All => "All Time".to_string(),
            WindowLabel::CalendarYear => self.start.format("%Y").to_string(),
            WindowLabel::CalendarQuarter => {
                let q = (self.start.month() - 1) / 3 + 1;
                format!("Q{} {}", q, self.start.year())
            }
            WindowLabel::Custom => {
                let from = self.start.date();
                let to = (self.end - Duration::days(1)).date();
                let from_fmt = from.format("%b %-d");
                if from.year() == to.year() {
                    format!("{} – {}, {}", from_fmt, to.format("%b %-d"), to.format("%Y"))
                } else {
                    format!(
                        "{}, {} – {}, {}",
                        from_fmt,
                        from.format("%Y"),
                        to.format("%b %-d"),
                        to.format("%Y")
                    )
                }
            }
        }
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// `YYYY-MM` key used for month rows.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, ReportError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ReportError::InvalidWindowSelector(format!("year {} out of range", year)))
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

fn shift_months(date: NaiveDate, months: u32) -> Result<NaiveDate, ReportError> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        ReportError::InvalidWindowSelector(format!("date {} out of range", date))
    })
}
