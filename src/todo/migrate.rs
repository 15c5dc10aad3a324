//! The migration pipeline: plan from the two notes, then commit or preview.
//!
//! `plan_migration` only reads. A real run writes exactly the texts held in
//! the plan, which is what makes a dry run a faithful preview.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::error::{VaultError, WarnCode};
use crate::todo::classify::classify;
use crate::todo::hierarchy::{IndentUnit, build_forest};
use crate::todo::merge::{self, PendingWrites, merge_into_target, new_note_text, rewrite_source};
use crate::todo::provenance::tag_groups;
use crate::todo::render::render_groups;
use crate::todo::section::{Heading, extract_section};
use crate::vault::locator::{NoteLocator, format_date};
use crate::vault::warn;

#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub heading: Heading,
    pub default_indent: IndentUnit,
    pub new_note_template: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub source_date: String,
    pub target_date: String,
    pub groups: usize,
    pub items: usize,
    pub tagged: usize,
    pub kept_groups: usize,
    pub malformed: Vec<String>,
    /// Source section lines that leave, as they will appear in the target.
    pub moved_lines: Vec<String>,
    /// Lines spliced into the target section.
    pub inserted_lines: Vec<String>,
    pub source_section_after: String,
    pub target_section_after: String,
    pub target_created: bool,
    pub section_created: bool,
    pub writes: PendingWrites,
}

#[derive(Debug, Clone)]
pub enum MigrationOutcome {
    /// Source note has no checklist heading; neither note is touched.
    NoSection { source_path: PathBuf, heading: String },
    /// Every group in the source is fully checked.
    NothingToMigrate {
        source_path: PathBuf,
        kept_groups: usize,
    },
    Planned(Box<MigrationPlan>),
}

fn read_note(path: &std::path::Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn plan_migration(
    locator: &NoteLocator,
    settings: &MigrationSettings,
    source_date: NaiveDate,
    target_date: NaiveDate,
) -> Result<MigrationOutcome> {
    let source_label = format_date(source_date);
    let target_label = format_date(target_date);
    if source_date == target_date {
        return Err(VaultError::SameNote(source_label).into());
    }

    let source_path = locator.locate(source_date)?;
    let source_text = read_note(&source_path)?;
    let sections = match extract_section(&source_text, &settings.heading) {
        Ok(sections) => sections,
        Err(VaultError::SectionNotFound { heading }) => {
            tracing::info!(note = %source_path.display(), %heading, "source has no checklist section");
            return Ok(MigrationOutcome::NoSection {
                source_path,
                heading,
            });
        }
        Err(err) => return Err(err.into()),
    };

    let forest = build_forest(&sections.body);
    for line in &forest.malformed {
        warn::emit(
            WarnCode::MalformedChecklistLine,
            "migrate.parse",
            &source_path.display().to_string(),
            line,
        );
    }
    let source_unit = forest.indent;
    let malformed = forest.malformed.clone();
    let (mut migrating, remaining) = classify(forest);
    if migrating.is_empty() {
        return Ok(MigrationOutcome::NothingToMigrate {
            source_path,
            kept_groups: remaining.trees.len(),
        });
    }

    let tagged = tag_groups(&mut migrating, &source_label);
    let source_after = rewrite_source(&sections, &remaining, settings.default_indent);

    let target_path = locator.locate_or_new(target_date);
    let target_before = match merge::read_target(&target_path) {
        Ok(text) => Some(text),
        Err(err) if matches!(err.downcast_ref::<VaultError>(), Some(VaultError::NoteAbsent { .. })) => None,
        Err(err) => return Err(err),
    };
    let target_created = target_before.is_none();
    let base = target_before.clone().unwrap_or_else(|| {
        new_note_text(
            settings.new_note_template.as_deref(),
            &settings.heading,
            &target_label,
        )
    });
    let merged = merge_into_target(
        &base,
        &settings.heading,
        &migrating,
        source_unit,
        settings.default_indent,
    );

    let plan = MigrationPlan {
        source_date: source_label,
        target_date: target_label,
        groups: migrating.len(),
        items: migrating.iter().map(|g| g.count()).sum(),
        tagged,
        kept_groups: remaining.trees.len(),
        malformed,
        moved_lines: render_groups(&migrating, source_unit.unwrap_or(settings.default_indent)),
        inserted_lines: merged.inserted.clone(),
        source_section_after: source_after.render_section(),
        target_section_after: merged.sections.render_section(),
        target_created,
        section_created: merged.section_created && !target_created,
        writes: PendingWrites {
            source_path,
            source_after: source_after.render(),
            target_path,
            target_before,
            target_after: merged.sections.render(),
        },
    };
    Ok(MigrationOutcome::Planned(Box::new(plan)))
}

/// Writes a planned migration. Both notes change, or an error leaves both as they were.
pub fn apply(plan: &MigrationPlan) -> Result<(), VaultError> {
    merge::commit(&plan.writes)?;
    tracing::info!(
        source = %plan.writes.source_path.display(),
        target = %plan.writes.target_path.display(),
        groups = plan.groups,
        "migrated unfinished todos"
    );
    Ok(())
}
