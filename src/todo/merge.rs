//! Splicing migrated groups into notes and committing both files.

use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{VaultError, WarnCode};
use crate::todo::hierarchy::{ChecklistForest, ChecklistNode, IndentUnit, build_forest};
use crate::todo::render::{render_forest, render_groups};
use crate::todo::section::{Heading, NoteSections, extract_section};
use crate::vault::util::{StagedWrite, write_atomic};
use crate::vault::warn;

/// Source note with its section body replaced by what stays behind.
///
/// Prefix, heading and suffix are untouched; the heading survives even when
/// nothing remains under it.
pub fn rewrite_source(
    sections: &NoteSections,
    remaining: &ChecklistForest,
    fallback: IndentUnit,
) -> NoteSections {
    NoteSections {
        body: render_forest(remaining, fallback),
        ..sections.clone()
    }
}

#[derive(Debug, Clone)]
pub struct TargetMerge {
    pub sections: NoteSections,
    pub inserted: Vec<String>,
    pub section_created: bool,
}

/// Appends `groups` after the last existing group of the target section.
///
/// `existing` is the target note's text; a note without the heading gets a new
/// section at its end. Existing target lines are never rewritten. Groups are
/// indented with the target's unit, else `source_unit`, else `fallback`.
pub fn merge_into_target(
    existing: &str,
    heading: &Heading,
    groups: &[ChecklistNode],
    source_unit: Option<IndentUnit>,
    fallback: IndentUnit,
) -> TargetMerge {
    let (mut sections, section_created) = match extract_section(existing, heading) {
        Ok(sections) => (sections, false),
        Err(_) => (NoteSections::appended_to(existing, heading), true),
    };

    let forest = build_forest(&sections.body);
    let unit = forest.indent.or(source_unit).unwrap_or(fallback);
    let mut inserted = render_groups(groups, unit);
    while inserted.last().is_some_and(|line| line.trim().is_empty()) {
        inserted.pop();
    }

    let at = sections.body.len() - forest.trailing.len();
    sections.body.splice(at..at, inserted.iter().cloned());
    TargetMerge {
        sections,
        inserted,
        section_created,
    }
}

/// Current text of the target note; `NoteAbsent` when it has not been created.
pub fn read_target(path: &Path) -> anyhow::Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(VaultError::NoteAbsent {
            path: path.to_path_buf(),
        }
        .into()),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Text for a target note that does not exist yet.
///
/// `{date}` and `{heading}` are substituted in the template; without one the
/// note holds only the heading.
pub fn new_note_text(template: Option<&str>, heading: &Heading, date: &str) -> String {
    let Some(template) = template.filter(|t| !t.trim().is_empty()) else {
        return format!("{}\n", heading.render());
    };
    let mut text = template
        .replace("{date}", date)
        .replace("{heading}", &heading.render());
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Everything needed to write one migration, computed before any write.
#[derive(Debug, Clone)]
pub struct PendingWrites {
    pub source_path: PathBuf,
    pub source_after: String,
    pub target_path: PathBuf,
    /// `None` when the target note is created by this migration.
    pub target_before: Option<String>,
    pub target_after: String,
}

fn write_failure(path: &Path, err: anyhow::Error) -> VaultError {
    VaultError::WriteFailure {
        path: path.to_path_buf(),
        reason: format!("{err:#}"),
    }
}

fn restore_target(writes: &PendingWrites) {
    let result = match &writes.target_before {
        Some(before) => write_atomic(&writes.target_path, before).map(|_| ()),
        None => fs::remove_file(&writes.target_path).map_err(anyhow::Error::from),
    };
    if let Err(err) = result {
        warn::emit(
            WarnCode::RollbackFailed,
            "migrate.commit",
            &writes.target_path.display().to_string(),
            &format!("{err:#}"),
        );
    }
}

/// Stages both notes, then replaces target before source.
///
/// A failed source replace puts the target back, so either both notes change
/// or neither does.
pub fn commit(writes: &PendingWrites) -> Result<(), VaultError> {
    let target = StagedWrite::prepare(&writes.target_path, &writes.target_after)
        .map_err(|err| write_failure(&writes.target_path, err))?;
    let source = StagedWrite::prepare(&writes.source_path, &writes.source_after)
        .map_err(|err| write_failure(&writes.source_path, err))?;

    target
        .commit()
        .map_err(|err| write_failure(&writes.target_path, err))?;
    tracing::debug!(path = %writes.target_path.display(), "target note written");

    if let Err(err) = source.commit() {
        restore_target(writes);
        return Err(write_failure(&writes.source_path, err));
    }
    tracing::debug!(path = %writes.source_path.display(), "source note written");
    Ok(())
}
