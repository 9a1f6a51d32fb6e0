use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chatdesk_shared::schemas::{BrowseResponse, FolderEntry};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Where `list(None)` starts: the configured root, else the home directory,
/// else the filesystem root.
pub fn default_root(browse_root: Option<&Path>) -> PathBuf {
    browse_root
        .map(Path::to_path_buf)
        .or_else(dirs_next::home_dir)
        .unwrap_or_else(|| PathBuf::from(std::path::MAIN_SEPARATOR_STR))
}

/// Stateless directory lister behind the folder picker and `GET /files/browse`.
#[derive(Debug, Clone)]
pub struct FilesystemBrowser {
    default_root: PathBuf,
}

impl FilesystemBrowser {
    pub fn new(default_root: PathBuf) -> Self {
        Self { default_root }
    }

    pub fn default_root(&self) -> &Path {
        &self.default_root
    }

    /// Lists the sub-directories of `dir`. Relative paths resolve against
    /// the default root; `None` or a blank string lists the root itself.
    pub async fn list(&self, dir: Option<&str>) -> AppResult<BrowseResponse> {
        let requested = match dir.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => self.default_root.join(d),
            None => self.default_root.clone(),
        };

        let current = match tokio::fs::canonicalize(&requested).await {
            Ok(p) => p,
            Err(e) => return Err(io_to_app_error(e, &requested)),
        };
        let meta = tokio::fs::metadata(&current)
            .await
            .map_err(|e| io_to_app_error(e, &current))?;
        if !meta.is_dir() {
            return Err(AppError::InvalidInput(format!(
                "not a directory: {}",
                display_path(&current)
            )));
        }

        let directories = read_subdirectories(&current).await?;
        debug!(path = %current.display(), count = directories.len(), "browsed directory");

        Ok(BrowseResponse {
            current: display_path(&current),
            parent: current.parent().map(display_path),
            directories,
            drives: available_drives(),
        })
    }
}

async fn read_subdirectories(dir: &Path) -> AppResult<Vec<FolderEntry>> {
    let mut read_dir = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| io_to_app_error(e, dir))?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .with_context(|| format!("failed to read {}", dir.display()))?
    {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        // Follows symlinks; broken links and unreadable entries are skipped.
        let path = entry.path();
        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            entries.push(FolderEntry {
                name,
                path: display_path(&path),
            });
        }
    }

    sort_entries(&mut entries);
    Ok(entries)
}

/// Case-insensitive by name, exact name as tie-break.
fn sort_entries(entries: &mut [FolderEntry]) {
    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn io_to_app_error(e: std::io::Error, path: &Path) -> AppError {
    match e.kind() {
        ErrorKind::NotFound => AppError::not_found("directory", display_path(path)),
        ErrorKind::PermissionDenied => {
            AppError::InvalidInput(format!("permission denied: {}", display_path(path)))
        }
        _ => AppError::Internal(
            anyhow::Error::new(e).context(format!("failed to access {}", path.display())),
        ),
    }
}

/// Path as shown to the client, without the Windows verbatim prefix that
/// `canonicalize` adds.
fn display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    match s.strip_prefix(r"\\?\") {
        Some(rest) => rest.to_string(),
        None => s.to_string(),
    }
}

#[cfg(windows)]
fn available_drives() -> Vec<String> {
    ('A'..='Z')
        .map(|letter| format!("{letter}:\\"))
        .filter(|root| Path::new(root).exists())
        .collect()
}

#[cfg(not(windows))]
fn available_drives() -> Vec<String> {
    Vec::new()
}
