//! Filesystem primitives for staged downloads.
//!
//! A download is staged in a sibling file that only ever grows by append and
//! is moved over its destination with a single rename once complete. This
//! crate provides the handful of operations that staging needs: creating
//! parent directories on demand, opening files for append or truncation,
//! renaming with retries, and idempotent removal.

mod error;

pub use error::{Error, Result};

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[cfg(unix)]
const DEFAULT_DIR_PERMISSIONS: u32 = 0o777;

#[cfg(not(unix))]
const DEFAULT_DIR_PERMISSIONS: u32 = 0;

#[derive(Clone, Copy, Debug)]
pub struct DirOptions {
    permissions: u32,
}

impl Default for DirOptions {
    fn default() -> Self { Self::new() }
}

impl DirOptions {
    pub fn new() -> Self {
        Self {
            permissions: DEFAULT_DIR_PERMISSIONS,
        }
    }

    #[cfg(unix)]
    pub fn permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    #[cfg(not(unix))]
    pub fn permissions(self, _permissions: u32) -> Self { self }

    #[cfg(unix)]
    pub fn into_permissions(self) -> Option<std::fs::Permissions> {
        Some(std::fs::Permissions::from_mode(self.permissions))
    }

    #[cfg(not(unix))]
    pub fn into_permissions(self) -> Option<std::fs::Permissions> { None }
}

#[derive(Clone, Copy, Debug)]
pub struct PromoteOptions {
    retry_count:    u32,
    retry_delay_ms: u64,
}

impl Default for PromoteOptions {
    fn default() -> Self { Self::new() }
}

impl PromoteOptions {
    pub fn new() -> Self {
        Self {
            retry_count:    8,
            retry_delay_ms: 8,
        }
    }

    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn get_retry_count(&self) -> u32 { self.retry_count }

    pub fn get_retry_delay_ms(&self) -> u64 { self.retry_delay_ms }
}

/// Creates `dir` and every missing ancestor, applying `options` permissions
/// to each directory this call creates. Existing directories are left alone.
pub fn ensure_dir(dir: impl AsRef<Path>, options: DirOptions) -> Result<()> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }

    let mut missing: Vec<PathBuf> = Vec::new();
    let mut cursor = Some(dir);
    while let Some(current) = cursor {
        if current.as_os_str().is_empty() || current.is_dir() {
            break;
        }
        missing.push(current.to_path_buf());
        cursor = current.parent();
    }

    for created in missing.iter().rev() {
        match std::fs::create_dir(created) {
            Ok(()) => {
                tracing::trace!(path = %created.display(), "created directory");
                if let Some(perms) = options.into_permissions() {
                    std::fs::set_permissions(created, perms).map_err(|source| Error::CreateDir {
                        path: created.clone(),
                        source,
                    })?;
                }
            }
            // Lost a race with another creator; the directory is there either way.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && created.is_dir() => {}
            Err(source) => {
                return Err(Error::CreateDir {
                    path: created.clone(),
                    source,
                });
            }
        }
    }

    Ok(())
}

/// Ensures the directory that will contain `path` exists.
pub fn ensure_parent_dir(path: impl AsRef<Path>, options: DirOptions) -> Result<()> {
    match path.as_ref().parent() {
        Some(parent) => ensure_dir(parent, options),
        None => Ok(()),
    }
}

/// Opens `path` for appending, creating it (and its parent directories) if
/// it does not exist yet.
pub fn open_append(path: impl AsRef<Path>, options: DirOptions) -> Result<File> {
    let path = path.as_ref();
    ensure_parent_dir(path, options)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Opens `path` for a single whole-content write, truncating anything
/// already there.
pub fn open_truncate(path: impl AsRef<Path>, options: DirOptions) -> Result<File> {
    let path = path.as_ref();
    ensure_parent_dir(path, options)?;
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Size in bytes of the file at `path`, or 0 when it does not exist.
///
/// Always reads fresh metadata.
pub fn file_len(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(Error::IsDirectory {
            path: path.to_path_buf(),
        }),
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(source) => Err(Error::Metadata {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Removes the file at `path` if present. Returns whether a file was removed.
pub fn remove_if_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(Error::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Atomically moves `src` over `dest`, replacing any existing file.
///
/// Transient `PermissionDenied` failures (a reader holding `dest` open on
/// Windows) are retried with doubling delay.
pub fn promote(src: impl AsRef<Path>, dest: impl AsRef<Path>, options: PromoteOptions) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    let mut delay = options.get_retry_delay_ms();
    let mut attempt = 0;

    loop {
        match std::fs::rename(src, dest) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied && attempt + 1 < options.get_retry_count() => {
                tracing::debug!(
                    from = %src.display(),
                    to = %dest.display(),
                    attempt,
                    "rename refused, retrying"
                );
                std::thread::sleep(Duration::from_millis(delay));
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(source) => {
                return Err(Error::Rename {
                    from: src.to_path_buf(),
                    to: dest.to_path_buf(),
                    source,
                });
            }
        }
    }
}
