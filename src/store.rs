//! Reading and writing catalogs on disk

use crate::error::{MtError, MtResult};
use crate::tree::{self, Tree};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load the reference catalog
///
/// Any failure here is fatal for the whole run: without a reference there is
/// nothing to plan against.
///
/// # Errors
/// - File not found or unreadable
/// - Invalid JSON
pub fn load_reference(path: &Path) -> MtResult<Tree> {
    let content = fs::read_to_string(path).map_err(|e| {
        MtError::Reference(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        MtError::Reference(format!("Failed to parse JSON from '{}': {}", path.display(), e))
    })
}

/// How a target file was found on disk
#[derive(Debug)]
pub enum TargetStatus {
    /// No file yet; the target starts empty
    Missing,
    Loaded,
    /// File exists but is not valid JSON; the target starts empty
    Malformed(serde_json::Error),
}

/// A target tree plus where it came from
#[derive(Debug)]
pub struct LoadedTarget {
    pub tree: Tree,
    pub status: TargetStatus,
}

impl LoadedTarget {
    /// The tree to diff against, or `None` when there was no usable file
    pub fn existing(&self) -> Option<&Tree> {
        match self.status {
            TargetStatus::Loaded => Some(&self.tree),
            TargetStatus::Missing | TargetStatus::Malformed(_) => None,
        }
    }
}

/// Load a target catalog, treating a missing or malformed file as empty
///
/// Only a file that exists but cannot be read (permissions, a directory in
/// its place) is an error.
pub fn load_target(path: &Path) -> MtResult<LoadedTarget> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no target file yet");
            return Ok(LoadedTarget {
                tree: tree::empty(),
                status: TargetStatus::Missing,
            });
        }
        Err(e) => return Err(MtError::io(path, e)),
    };

    match serde_json::from_str(&content) {
        Ok(tree) => Ok(LoadedTarget {
            tree,
            status: TargetStatus::Loaded,
        }),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "target is not valid JSON, starting from an empty tree"
            );
            Ok(LoadedTarget {
                tree: tree::empty(),
                status: TargetStatus::Malformed(e),
            })
        }
    }
}

/// Path of the catalog for `locale` inside `dir`
pub fn target_path(dir: &Path, locale: &str) -> PathBuf {
    dir.join(format!("{}.json", locale))
}

/// Where the previous content of `path` is kept: `fr.json` → `fr.json.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Pretty JSON with two-space indentation, unescaped non-ASCII and a trailing newline
pub fn render(tree: &Tree) -> MtResult<String> {
    let mut text = serde_json::to_string_pretty(tree)?;
    text.push('\n');
    Ok(text)
}

/// Write `tree` to `path`, replacing the file atomically
///
/// The content goes to a sibling temporary file which is then renamed over
/// the target, so a crash never leaves a half-written catalog. With `backup`,
/// an existing file is copied to `<path>.bak` first.
pub fn save_tree(path: &Path, tree: &Tree, backup: bool) -> MtResult<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| MtError::io(dir, e))?;
    }

    if backup && path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|e| MtError::io(&backup, e))?;
        debug!(path = %backup.display(), "backup written");
    }

    let text = render(tree)?;
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, text).map_err(|e| MtError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %cleanup, "could not remove temporary file");
        }
        return Err(MtError::io(path, e));
    }
    Ok(())
}
