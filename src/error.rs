use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("checklist heading `{heading}` not found")]
    SectionNotFound { heading: String },
    #[error("no daily note for {date} under {}", dir.display())]
    NoteNotFound { date: String, dir: PathBuf },
    #[error("note {} does not exist yet", path.display())]
    NoteAbsent { path: PathBuf },
    #[error("failed to write {}: {reason}", path.display())]
    WriteFailure { path: PathBuf, reason: String },
    #[error("invalid date `{0}`: use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid week specification `{0}`: use last, current, a number of weeks ago, or YYYY-MM-DD")]
    InvalidWeekSpec(String),
    #[error("vault directory not found: {}", .0.display())]
    VaultNotFound(PathBuf),
    #[error("source and target are the same note ({0})")]
    SameNote(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnCode {
    MalformedChecklistLine,
    UnreadableNote,
    MoveFailed,
    RollbackFailed,
}

impl WarnCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedChecklistLine => "W001_MALFORMED_CHECKLIST_LINE",
            Self::UnreadableNote => "W002_UNREADABLE_NOTE",
            Self::MoveFailed => "W003_MOVE_FAILED",
            Self::RollbackFailed => "W004_ROLLBACK_FAILED",
        }
    }
}
