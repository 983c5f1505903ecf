//! Static stylesheet directory copy.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Copy the stylesheet directory into the output tree.
///
/// Nothing is copied when the destination already exists or the source is
/// missing; both cases are logged. Returns whether a copy took place.
///
/// # Errors
///
/// Returns an error if the copy starts but a directory or file cannot be
/// written.
pub async fn install_css_dir(src: &Path, dst: &Path) -> Result<bool> {
    if tokio::fs::try_exists(dst).await.unwrap_or(false) {
        warn!(src = %src.display(), dst = %dst.display(), "Stylesheet directory already exists, not copying");
        return Ok(false);
    }
    let is_dir = tokio::fs::metadata(src)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        warn!(src = %src.display(), "Stylesheet directory not found, not copying");
        return Ok(false);
    }

    copy_dir_best_effort(src, dst).await?;
    info!(src = %src.display(), dst = %dst.display(), "Copied stylesheet directory");
    Ok(true)
}

/// Recursive directory copy that skips unreadable files.
async fn copy_dir_best_effort(src: &Path, dst: &Path) -> Result<()> {
    // Async recursion is not allowed without boxing; use an explicit stack.
    let mut stack = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((src_dir, dst_dir)) = stack.pop() {
        tokio::fs::create_dir_all(&dst_dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", dst_dir.display()))?;

        let mut entries = tokio::fs::read_dir(&src_dir)
            .await
            .with_context(|| format!("Failed to read directory: {}", src_dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let src_path = entry.path();
            let dst_path = dst_dir.join(entry.file_name());
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                stack.push((src_path, dst_path));
                continue;
            }

            if file_type.is_file() {
                match tokio::fs::copy(&src_path, &dst_path).await {
                    Ok(_) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                        debug!(path = %src_path.display(), "Skipping unreadable stylesheet file");
                    }
                    Err(e) => {
                        return Err(anyhow::Error::new(e))
                            .context(format!("Failed to copy file: {}", src_path.display()));
                    }
                }
            }
        }
    }

    Ok(())
}
