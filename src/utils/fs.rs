//! Write-once artifact I/O
//!
//! Every file the pipeline produces goes through [`write_artifact`], which
//! never truncates or appends to an existing file.

use crate::utils::{ExportError, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Permission bits for artifacts holding unencrypted key material
pub const PRIVATE_FILE_MODE: u32 = 0o600;

/// Read an artifact fully into memory
pub fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| ExportError::FileRead {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Fail with `ArtifactExists` if something already lives at `path`
pub fn ensure_absent(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ExportError::ArtifactExists {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Create `path` and write `data` to it.
///
/// The file must not exist yet. `mode` sets the Unix permission bits at
/// creation time and is ignored elsewhere.
pub fn write_artifact(path: &Path, data: &[u8], mode: Option<u32>) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if let Some(mode) = mode {
            options.mode(mode);
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path).map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            ExportError::ArtifactExists {
                path: path.display().to_string(),
            }
        } else {
            ExportError::FileWrite {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        }
    })?;

    if let Err(e) = file.write_all(data).and_then(|_| file.sync_all()) {
        drop(file);
        return Err(discard_partial(path, e));
    }

    tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Remove a file whose write failed half way and describe the failure.
///
/// The file was created by this process, so nothing else is lost.
fn discard_partial(path: &Path, cause: std::io::Error) -> ExportError {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!("Failed to remove partial {}: {}", path.display(), e);
    }
    ExportError::FileWrite {
        path: path.display().to_string(),
        message: cause.to_string(),
    }
}
