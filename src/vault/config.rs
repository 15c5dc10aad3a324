use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::todo::hierarchy::IndentUnit;
use crate::todo::section::Heading;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSection {
    /// Vault root. Relative paths resolve against the home directory.
    pub path: String,
    pub daily_notes_dir: String,
    pub archive_dir: String,
}

impl Default for VaultSection {
    fn default() -> Self {
        Self {
            path: "Desktop/obsidian_vault".to_string(),
            daily_notes_dir: "Daily notes".to_string(),
            archive_dir: "4 ARCHIVE/Weekly Notes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoConfig {
    pub heading: String,
    /// `2`, `4`, any width 1-8, or `tab`. Used when a section has no nested items yet.
    pub indent: String,
    /// Body of a freshly created target note. `{date}` and `{heading}` are substituted.
    #[serde(default)]
    pub new_note_template: Option<String>,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            heading: "## To do".to_string(),
            indent: "2".to_string(),
            new_note_template: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Directories searched for embedded screenshots, relative to the vault root.
    /// An empty entry or `.` means the vault root itself.
    pub screenshot_dirs: Vec<String>,
    pub image_extensions: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            screenshot_dirs: vec![
                ".".to_string(),
                "attachments".to_string(),
                "assets".to_string(),
                "Daily notes".to_string(),
            ],
            image_extensions: ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpkeepConfig {
    pub vault: VaultSection,
    pub todo: TodoConfig,
    pub archive: ArchiveConfig,
}

impl UpkeepConfig {
    pub fn heading(&self) -> Result<Heading> {
        Heading::parse(&self.todo.heading)
            .ok_or_else(|| anyhow!("invalid todo heading `{}`", self.todo.heading))
    }

    pub fn indent_unit(&self) -> Result<IndentUnit> {
        IndentUnit::parse(&self.todo.indent)
            .ok_or_else(|| anyhow!("invalid todo indent `{}`", self.todo.indent))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialUpkeepConfig {
    vault: Option<VaultSection>,
    todo: Option<TodoConfig>,
    archive: Option<ArchiveConfig>,
}

pub const CONFIG_PATH_ENV: &str = "VAULT_UPKEEP_CONFIG_PATH";

/// Variables that override config keys, applied after the file.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("VAULT_UPKEEP_VAULT_PATH", "vault.path"),
    ("VAULT_UPKEEP_DAILY_NOTES_DIR", "vault.daily_notes_dir"),
    ("VAULT_UPKEEP_ARCHIVE_DIR", "vault.archive_dir"),
    ("VAULT_UPKEEP_TODO_HEADING", "todo.heading"),
    ("VAULT_UPKEEP_INDENT", "todo.indent"),
    ("VAULT_UPKEEP_SCREENSHOT_DIRS", "archive.screenshot_dirs"),
    ("VAULT_UPKEEP_IMAGE_EXTENSIONS", "archive.image_extensions"),
];

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

impl UpkeepConfig {
    /// Sets one dotted key. Blank values leave the key as it was.
    fn apply_override(&mut self, key: &str, raw: &str) {
        let value = raw.trim();
        if value.is_empty() {
            return;
        }
        let list = split_csv(value);
        match key {
            "vault.path" => self.vault.path = value.to_string(),
            "vault.daily_notes_dir" => self.vault.daily_notes_dir = value.to_string(),
            "vault.archive_dir" => self.vault.archive_dir = value.to_string(),
            "todo.heading" => self.todo.heading = value.to_string(),
            "todo.indent" => self.todo.indent = value.to_string(),
            "archive.screenshot_dirs" if !list.is_empty() => self.archive.screenshot_dirs = list,
            "archive.image_extensions" if !list.is_empty() => {
                self.archive.image_extensions = list
            }
            _ => {}
        }
    }
}

fn apply_env_overrides(cfg: &mut UpkeepConfig, lookup: impl Fn(&str) -> Option<String>) {
    for &(var, key) in ENV_OVERRIDES {
        if let Some(raw) = lookup(var) {
            cfg.apply_override(key, &raw);
        }
    }
}

fn validate(cfg: &UpkeepConfig) -> Result<()> {
    if cfg.vault.path.trim().is_empty() {
        return Err(anyhow!("invalid vault path: cannot be empty"));
    }
    if cfg.vault.daily_notes_dir.trim().is_empty() {
        return Err(anyhow!("invalid daily notes dir: cannot be empty"));
    }
    if cfg.vault.archive_dir.trim().is_empty() {
        return Err(anyhow!("invalid archive dir: cannot be empty"));
    }
    cfg.heading()?;
    cfg.indent_unit()?;
    if cfg.archive.image_extensions.is_empty() {
        return Err(anyhow!("invalid image extensions: list cannot be empty"));
    }
    if cfg
        .archive
        .image_extensions
        .iter()
        .any(|ext| ext.trim().is_empty() || ext.contains('.'))
    {
        return Err(anyhow!(
            "invalid image extensions: use bare names like `png`, without dots"
        ));
    }
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var(CONFIG_PATH_ENV) {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let base = dirs::config_dir()?;
    Some(base.join("vault-upkeep").join("config.toml"))
}

fn merge_file_config(base: &mut UpkeepConfig, path: &Path) -> Result<()> {
    let raw = fs::read_to_string(path)
        .map_err(|err| anyhow!("failed to read config {}: {err}", path.display()))?;
    let parsed: PartialUpkeepConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse config {}: {err}", path.display()))?;
    if let Some(vault) = parsed.vault {
        base.vault = vault;
    }
    if let Some(todo) = parsed.todo {
        base.todo = todo;
    }
    if let Some(archive) = parsed.archive {
        base.archive = archive;
    }
    Ok(())
}

/// Defaults, then the TOML file, then `VAULT_UPKEEP_*` variables.
///
/// An explicit path must exist; the default location is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<UpkeepConfig> {
    let mut cfg = UpkeepConfig::default();
    match explicit {
        Some(path) => merge_file_config(&mut cfg, path)?,
        None => {
            if let Some(path) = resolve_config_path().filter(|p| p.exists()) {
                merge_file_config(&mut cfg, &path)?;
            }
        }
    }

    apply_env_overrides(&mut cfg, |var| env::var(var).ok());
    validate(&cfg)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid() {
        let cfg = UpkeepConfig::default();
        validate(&cfg).expect("defaults validate");
        assert_eq!(cfg.indent_unit().expect("indent"), IndentUnit::Spaces(2));
        assert_eq!(cfg.heading().expect("heading").level, 2);
    }

    #[test]
    fn partial_file_only_replaces_present_tables() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "[todo]\nheading = \"### Tasks\"\nindent = \"tab\"\n",
        )
        .expect("write config");

        let mut cfg = UpkeepConfig::default();
        merge_file_config(&mut cfg, &path).expect("merge");
        assert_eq!(cfg.todo.heading, "### Tasks");
        assert_eq!(cfg.indent_unit().expect("indent"), IndentUnit::Tab);
        assert_eq!(cfg.vault.daily_notes_dir, "Daily notes");
        validate(&cfg).expect("valid");
    }

    #[test]
    fn malformed_file_reports_path() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[todo\nheading = 1").expect("write config");

        let mut cfg = UpkeepConfig::default();
        let err = merge_file_config(&mut cfg, &path).expect_err("parse failure");
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn validate_rejects_plain_text_heading_and_bad_indent() {
        let mut cfg = UpkeepConfig::default();
        cfg.todo.heading = "To do".to_string();
        assert!(validate(&cfg).is_err());

        let mut cfg = UpkeepConfig::default();
        cfg.todo.indent = "0".to_string();
        assert!(validate(&cfg).is_err());

        let mut cfg = UpkeepConfig::default();
        cfg.archive.image_extensions = vec![".png".to_string()];
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn every_override_variable_changes_its_key() {
        for &(var, key) in ENV_OVERRIDES {
            let mut cfg = UpkeepConfig::default();
            let before = format!("{cfg:?}");
            apply_env_overrides(&mut cfg, |asked| (asked == var).then(|| "7".to_string()));
            assert_ne!(format!("{cfg:?}"), before, "{var} should set {key}");
        }
    }

    #[test]
    fn overrides_split_lists_and_ignore_blanks() {
        let mut cfg = UpkeepConfig::default();
        apply_env_overrides(&mut cfg, |var| match var {
            "VAULT_UPKEEP_IMAGE_EXTENSIONS" => Some(" png , heic ,".to_string()),
            "VAULT_UPKEEP_SCREENSHOT_DIRS" => Some(" , ".to_string()),
            "VAULT_UPKEEP_TODO_HEADING" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(cfg.archive.image_extensions, vec!["png", "heic"]);
        assert_eq!(cfg.archive.screenshot_dirs, ArchiveConfig::default().screenshot_dirs);
        assert_eq!(cfg.todo.heading, "## To do");
    }
}
