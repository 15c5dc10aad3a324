use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if from == to {
        return Ok(());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    match fs::rename(from, to) {
        Ok(_) => Ok(()),
        Err(rename_err) => {
            if matches!(
                rename_err.kind(),
                ErrorKind::CrossesDevices | ErrorKind::PermissionDenied
            ) {
                fs::copy(from, to).with_context(|| {
                    format!("failed to copy {} to {}", from.display(), to.display())
                })?;
                fs::remove_file(from)
                    .with_context(|| format!("failed to remove {}", from.display()))?;
                Ok(())
            } else {
                Err(rename_err).with_context(|| {
                    format!("failed to move {} to {}", from.display(), to.display())
                })
            }
        }
    }
}

/// First free `stem.ext`, `stem_1.ext`, `stem_2.ext`, ... inside `dir`.
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let ext = as_path.extension().and_then(|s| s.to_str());
    let mut counter = 1usize;
    loop {
        let name = match ext {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        let next = dir.join(name);
        if !next.exists() {
            return next;
        }
        counter += 1;
    }
}

/// Mode the replacement should carry: the current file's, or `rw-r--r--` for
/// a new one rather than the private mode temp files are created with.
fn permissions_for(dest: &Path) -> Result<Option<fs::Permissions>> {
    match fs::metadata(dest) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(err) => Err(err).with_context(|| format!("failed to stat {}", dest.display())),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

/// Contents written and synced next to `dest`, not yet visible under `dest`.
#[derive(Debug)]
pub struct StagedWrite {
    pub dest: PathBuf,
    file: NamedTempFile,
}

impl StagedWrite {
    pub fn prepare(dest: &Path, contents: &str) -> Result<Self> {
        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        if let Some(perms) = permissions_for(dest)? {
            file.as_file()
                .set_permissions(perms)
                .with_context(|| format!("failed to set permissions for {}", dest.display()))?;
        }
        file.write_all(contents.as_bytes())
            .with_context(|| format!("failed to stage {}", dest.display()))?;
        file.as_file()
            .sync_all()
            .with_context(|| format!("failed to sync staged {}", dest.display()))?;
        Ok(Self {
            dest: dest.to_path_buf(),
            file,
        })
    }

    /// Atomically replaces `dest` with the staged contents.
    pub fn commit(self) -> Result<PathBuf> {
        let dest = self.dest;
        self.file
            .persist(&dest)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to replace {}", dest.display()))?;
        Ok(dest)
    }
}

pub fn write_atomic(dest: &Path, contents: &str) -> Result<PathBuf> {
    StagedWrite::prepare(dest, contents)?.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unique_destination_appends_counter() {
        let tmp = tempdir().expect("tempdir");
        assert_eq!(
            unique_destination(tmp.path(), "shot.png"),
            tmp.path().join("shot.png")
        );

        fs::write(tmp.path().join("shot.png"), "a").expect("write");
        fs::write(tmp.path().join("shot_1.png"), "b").expect("write");
        assert_eq!(
            unique_destination(tmp.path(), "shot.png"),
            tmp.path().join("shot_2.png")
        );

        fs::write(tmp.path().join("2025-08-01"), "c").expect("write");
        assert_eq!(
            unique_destination(tmp.path(), "2025-08-01"),
            tmp.path().join("2025-08-01_1")
        );
    }

    #[test]
    fn staged_write_is_invisible_until_commit() {
        let tmp = tempdir().expect("tempdir");
        let dest = tmp.path().join("note.md");
        fs::write(&dest, "before\n").expect("write");

        let staged = StagedWrite::prepare(&dest, "after\n").expect("stage");
        assert_eq!(fs::read_to_string(&dest).expect("read"), "before\n");

        staged.commit().expect("commit");
        assert_eq!(fs::read_to_string(&dest).expect("read"), "after\n");
    }

    #[cfg(unix)]
    #[test]
    fn commit_keeps_mode_of_replaced_file() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().expect("tempdir");
        let dest = tmp.path().join("note.md");
        fs::write(&dest, "before\n").expect("write");
        fs::set_permissions(&dest, fs::Permissions::from_mode(0o640)).expect("chmod");

        write_atomic(&dest, "after\n").expect("write atomic");
        let mode = fs::metadata(&dest).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);

        let fresh = tmp.path().join("fresh.md");
        write_atomic(&fresh, "new\n").expect("write atomic");
        let mode = fs::metadata(&fresh).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn dropped_stage_leaves_no_temp_files() {
        let tmp = tempdir().expect("tempdir");
        let dest = tmp.path().join("note.md");
        {
            let _staged = StagedWrite::prepare(&dest, "never\n").expect("stage");
        }
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(tmp.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn move_file_creates_parent_dirs() {
        let tmp = tempdir().expect("tempdir");
        let from = tmp.path().join("a.txt");
        let to = tmp.path().join("nested/dir/a.txt");
        fs::write(&from, "x").expect("write");

        move_file(&from, &to).expect("move");
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).expect("read"), "x");
    }
}
