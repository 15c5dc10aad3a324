use chrono::{Datelike, Duration, NaiveDate};

use crate::error::VaultError;
use crate::vault::locator::{format_date, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekSpec {
    WeeksAgo(u32),
    Containing(NaiveDate),
}

impl WeekSpec {
    /// `None`, `last` and `previous` mean one week ago; `current`/`this` mean this week.
    pub fn parse(raw: Option<&str>) -> Result<Self, VaultError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::WeeksAgo(1));
        };
        match raw.to_ascii_lowercase().as_str() {
            "last" | "previous" => return Ok(Self::WeeksAgo(1)),
            "current" | "this" => return Ok(Self::WeeksAgo(0)),
            _ => {}
        }
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw
                .parse::<u32>()
                .map(Self::WeeksAgo)
                .map_err(|_| VaultError::InvalidWeekSpec(raw.to_string()));
        }
        parse_date(raw)
            .map(Self::Containing)
            .map_err(|_| VaultError::InvalidWeekSpec(raw.to_string()))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::WeeksAgo(0) => "current week".to_string(),
            Self::WeeksAgo(1) => "previous week".to_string(),
            Self::WeeksAgo(n) => format!("{n} weeks ago"),
            Self::Containing(date) => format!("week containing {}", format_date(*date)),
        }
    }

    pub fn range(&self, today: NaiveDate) -> Result<WeekRange, VaultError> {
        let anchor = match self {
            Self::WeeksAgo(n) => today
                .checked_sub_signed(Duration::days(7 * i64::from(*n)))
                .ok_or_else(|| VaultError::InvalidWeekSpec(n.to_string()))?,
            Self::Containing(date) => *date,
        };
        WeekRange::containing(anchor).ok_or_else(|| VaultError::InvalidWeekSpec(self.raw()))
    }

    fn raw(&self) -> String {
        match self {
            Self::WeeksAgo(n) => n.to_string(),
            Self::Containing(date) => format_date(*date),
        }
    }
}

/// Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub monday: NaiveDate,
    pub sunday: NaiveDate,
}

impl WeekRange {
    /// `None` when the week runs past the calendar's range.
    pub fn containing(date: NaiveDate) -> Option<Self> {
        let offset = i64::from(date.weekday().num_days_from_monday());
        let monday = date.checked_sub_signed(Duration::days(offset))?;
        let sunday = monday.checked_add_signed(Duration::days(6))?;
        Some(Self { monday, sunday })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.monday.iter_days().take(7)
    }

    pub fn folder_name(&self) -> String {
        format!("Week of {}", format_date(self.monday))
    }
}
