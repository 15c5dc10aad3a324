//! Weekly archiving of daily notes and the screenshots they embed.

use anyhow::Result;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{VaultError, WarnCode};
use crate::vault::config::ArchiveConfig;
use crate::vault::locator::NoteLocator;
use crate::vault::paths::VaultPaths;
use crate::vault::util::{move_file, unique_destination};
use crate::vault::warn;
use crate::vault::week::{WeekRange, WeekSpec};

static EMBED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[\[([^\]|]+)(?:\|[^\]]*)?\]\]").expect("valid embed regex"));

#[derive(Debug, Clone)]
pub struct ArchivePlan {
    pub description: String,
    pub range: WeekRange,
    pub notes: Vec<PathBuf>,
    pub screenshots: Vec<PathBuf>,
    pub destination: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MovedFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveOutcome {
    pub moved: Vec<MovedFile>,
    pub failed: Vec<(PathBuf, String)>,
}

fn has_image_extension(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// Image names embedded as `![[name.ext]]` (alias after `|` ignored).
pub fn embedded_images(content: &str, extensions: &[String]) -> Vec<String> {
    EMBED_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|name| has_image_extension(name, extensions))
        .collect()
}

fn search_dirs(paths: &VaultPaths, cfg: &ArchiveConfig) -> Vec<PathBuf> {
    cfg.screenshot_dirs
        .iter()
        .map(|dir| match dir.trim() {
            "" | "." => paths.vault_root.clone(),
            rel => paths.vault_root.join(rel),
        })
        .collect()
}

pub fn find_screenshots(notes: &[PathBuf], paths: &VaultPaths, cfg: &ArchiveConfig) -> Vec<PathBuf> {
    let dirs = search_dirs(paths, cfg);
    let mut found = BTreeSet::new();
    for note in notes {
        let content = match fs::read_to_string(note) {
            Ok(content) => content,
            Err(err) => {
                warn::emit(
                    WarnCode::UnreadableNote,
                    "archive.scan",
                    &note.display().to_string(),
                    &err.to_string(),
                );
                continue;
            }
        };
        for name in embedded_images(&content, &cfg.image_extensions) {
            if let Some(hit) = dirs.iter().map(|dir| dir.join(&name)).find(|p| p.is_file()) {
                found.insert(hit);
            }
        }
    }
    found.into_iter().collect()
}

pub fn notes_for_week(locator: &NoteLocator, range: &WeekRange) -> Vec<PathBuf> {
    range
        .days()
        .filter_map(|day| locator.locate(day).ok())
        .collect()
}

pub fn plan_archive(
    paths: &VaultPaths,
    cfg: &ArchiveConfig,
    spec: WeekSpec,
    today: NaiveDate,
) -> Result<ArchivePlan> {
    if !paths.vault_root.is_dir() {
        return Err(VaultError::VaultNotFound(paths.vault_root.clone()).into());
    }
    if !paths.daily_notes_dir.is_dir() {
        return Err(VaultError::VaultNotFound(paths.daily_notes_dir.clone()).into());
    }

    let range = spec.range(today)?;
    let locator = NoteLocator::new(&paths.daily_notes_dir);
    let notes = notes_for_week(&locator, &range);
    let screenshots = find_screenshots(&notes, paths, cfg);
    Ok(ArchivePlan {
        description: spec.describe(),
        destination: paths.archive_dir.join(range.folder_name()),
        range,
        notes,
        screenshots,
    })
}

/// Moves notes then screenshots; a failed move is recorded and the rest continue.
pub fn apply_archive(plan: &ArchivePlan) -> Result<ArchiveOutcome> {
    fs::create_dir_all(&plan.destination).map_err(|err| VaultError::WriteFailure {
        path: plan.destination.clone(),
        reason: err.to_string(),
    })?;

    let mut outcome = ArchiveOutcome::default();
    for file in plan.notes.iter().chain(plan.screenshots.iter()) {
        let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let to = unique_destination(&plan.destination, name);
        match move_file(file, &to) {
            Ok(()) => {
                tracing::debug!(from = %file.display(), to = %to.display(), "archived");
                outcome.moved.push(MovedFile {
                    from: file.clone(),
                    to,
                });
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn::emit(
                    WarnCode::MoveFailed,
                    "archive.move",
                    &file.display().to_string(),
                    &reason,
                );
                outcome.failed.push((file.clone(), reason));
            }
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::config::UpkeepConfig;
    use crate::vault::locator::parse_date;
    use crate::vault::paths::paths_for_root;
    use tempfile::tempdir;

    fn date(raw: &str) -> NaiveDate {
        parse_date(raw).expect("date")
    }

    fn vault(root: &Path) -> VaultPaths {
        let paths = paths_for_root(root.to_path_buf(), &UpkeepConfig::default());
        fs::create_dir_all(&paths.daily_notes_dir).expect("mkdir daily");
        paths
    }

    #[test]
    fn embedded_images_filters_by_extension_and_alias() {
        let exts = ArchiveConfig::default().image_extensions;
        let names = embedded_images(
            "![[Screenshot 1.PNG]] and ![[diagram.webp|300]] but not ![[Other note]] or [[link.png]]",
            &exts,
        );
        assert_eq!(names, vec!["Screenshot 1.PNG", "diagram.webp"]);
    }

    #[test]
    fn plan_collects_week_notes_and_first_matching_screenshot() {
        let tmp = tempdir().expect("tempdir");
        let paths = vault(tmp.path());
        fs::write(
            paths.daily_notes_dir.join("2025-05-19.md"),
            "![[shot.png]]\n![[shot.png]]\n",
        )
        .expect("write");
        fs::write(paths.daily_notes_dir.join("2025-05-25"), "plain\n").expect("write");
        fs::write(paths.daily_notes_dir.join("2025-05-26.md"), "next week\n").expect("write");
        fs::create_dir_all(paths.vault_root.join("attachments")).expect("mkdir");
        fs::write(paths.vault_root.join("attachments/shot.png"), "png").expect("write");

        let plan = plan_archive(
            &paths,
            &ArchiveConfig::default(),
            WeekSpec::Containing(date("2025-05-21")),
            date("2025-08-01"),
        )
        .expect("plan");

        assert_eq!(
            plan.notes,
            vec![
                paths.daily_notes_dir.join("2025-05-19.md"),
                paths.daily_notes_dir.join("2025-05-25"),
            ]
        );
        assert_eq!(plan.screenshots, vec![paths.vault_root.join("attachments/shot.png")]);
        assert_eq!(plan.destination, paths.archive_dir.join("Week of 2025-05-19"));
    }

    #[test]
    fn apply_moves_files_and_renames_conflicts() {
        let tmp = tempdir().expect("tempdir");
        let paths = vault(tmp.path());
        fs::write(paths.daily_notes_dir.join("2025-05-19.md"), "![[shot.png]]\n").expect("write");
        fs::write(paths.vault_root.join("shot.png"), "png").expect("write");

        let plan = plan_archive(
            &paths,
            &ArchiveConfig::default(),
            WeekSpec::Containing(date("2025-05-19")),
            date("2025-08-01"),
        )
        .expect("plan");
        fs::create_dir_all(&plan.destination).expect("mkdir dest");
        fs::write(plan.destination.join("shot.png"), "older").expect("write");

        let outcome = apply_archive(&plan).expect("apply");
        assert_eq!(outcome.moved.len(), 2);
        assert!(outcome.failed.is_empty());
        assert!(!paths.daily_notes_dir.join("2025-05-19.md").exists());
        assert!(plan.destination.join("2025-05-19.md").exists());
        assert_eq!(
            fs::read_to_string(plan.destination.join("shot_1.png")).expect("read"),
            "png"
        );
    }

    #[test]
    fn missing_daily_dir_is_reported() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_root(tmp.path().to_path_buf(), &UpkeepConfig::default());
        let err = plan_archive(
            &paths,
            &ArchiveConfig::default(),
            WeekSpec::WeeksAgo(1),
            date("2025-08-01"),
        )
        .expect_err("no daily dir");
        assert!(matches!(
            err.downcast_ref::<VaultError>(),
            Some(VaultError::VaultNotFound(_))
        ));
    }
}
