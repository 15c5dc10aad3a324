use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::error::VaultError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(raw: &str) -> Result<NaiveDate, VaultError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| VaultError::InvalidDate(raw.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Finds daily notes named after their date, with or without a `.md` extension.
#[derive(Debug, Clone)]
pub struct NoteLocator {
    daily_notes_dir: PathBuf,
}

impl NoteLocator {
    pub fn new(daily_notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            daily_notes_dir: daily_notes_dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.daily_notes_dir
    }

    fn candidates(&self, date: NaiveDate) -> [PathBuf; 2] {
        let stem = format_date(date);
        [
            self.daily_notes_dir.join(&stem),
            self.daily_notes_dir.join(format!("{stem}.md")),
        ]
    }

    pub fn locate(&self, date: NaiveDate) -> Result<PathBuf, VaultError> {
        self.candidates(date)
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| VaultError::NoteNotFound {
                date: format_date(date),
                dir: self.daily_notes_dir.clone(),
            })
    }

    /// Existing note for `date`, or the `.md` path a new one should be created at.
    pub fn locate_or_new(&self, date: NaiveDate) -> PathBuf {
        self.locate(date)
            .unwrap_or_else(|_| self.daily_notes_dir.join(format!("{}.md", format_date(date))))
    }
}
