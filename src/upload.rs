use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::remote::FileUploader;

/// Expand a leading `~` and make the path absolute. The file must exist.
pub fn resolve_path(raw: &str, home: Option<&Path>) -> Result<PathBuf> {
    let expanded = match (raw.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(raw),
    };
    let abs = std::path::absolute(&expanded)
        .with_context(|| format!("failed to resolve {}", expanded.display()))?;
    if !abs.exists() {
        bail!("path does not exist: {}", abs.display());
    }
    Ok(abs)
}

/// Share `path` into `destination_id`, then optionally delete it locally.
/// A failed removal is logged and does not fail the upload.
pub fn share_file<U: FileUploader + ?Sized>(
    uploader: &U,
    path: &Path,
    destination_id: &str,
    message: &str,
    remove_after: bool,
) -> Result<()> {
    uploader
        .upload_file(path, destination_id, message)
        .with_context(|| format!("failed to upload {}", path.display()))?;
    info!("Successfully uploaded file: {}", path.display());

    if remove_after {
        debug!("removing file: {}", path.display());
        if let Err(err) = fs::remove_file(path) {
            warn!("failed to remove {}: {err}", path.display());
        }
    }
    Ok(())
}
