use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::vault::config::UpkeepConfig;

#[derive(Debug, Clone)]
pub struct VaultPaths {
    pub vault_root: PathBuf,
    pub daily_notes_dir: PathBuf,
    pub archive_dir: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn anchor_to_home(raw: &str, home: &Path) -> PathBuf {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home.join(rest);
    }
    let candidate = PathBuf::from(trimmed);
    if candidate.is_absolute() {
        candidate
    } else {
        home.join(candidate)
    }
}

pub fn paths_for_root(vault_root: PathBuf, cfg: &UpkeepConfig) -> VaultPaths {
    let daily_notes_dir = vault_root.join(cfg.vault.daily_notes_dir.trim());
    let archive_dir = vault_root.join(cfg.vault.archive_dir.trim());
    VaultPaths {
        vault_root,
        daily_notes_dir,
        archive_dir,
    }
}

/// `override_path` comes from `--vault-path` and wins over the configured path.
pub fn resolve_paths(cfg: &UpkeepConfig, override_path: Option<&str>) -> Result<VaultPaths> {
    let raw = override_path
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(&cfg.vault.path);
    let candidate = PathBuf::from(raw.trim());
    let vault_root = if candidate.is_absolute() {
        candidate
    } else {
        anchor_to_home(raw, &required_home_dir()?)
    };
    Ok(paths_for_root(vault_root, cfg))
}
