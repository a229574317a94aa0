//! Filesystem locations and path utilities.
//!
//! This module centralizes all filesystem- and path-related logic for
//! `songplays-core`. It is responsible for:
//!
//! - Interpreting user-facing root strings as a [`StorageLocation`].
//! - Discovering raw record files under the input root (see
//!   [`list_record_files`]).
//! - Clearing a table's subpath under the output root before it is rewritten,
//!   which is how full-overwrite semantics are provided.
//!
//! Path conventions (which directory holds what) live in [`layout`].
//!
//! v0.1 only supports the local filesystem. The API takes a location plus a
//! relative path everywhere so an object-store backend can be added without
//! touching the pipeline stages.

mod error;
pub mod layout;

use std::{
    io,
    path::{Path, PathBuf},
};

use log::debug;
use snafu::prelude::*;
use tokio::fs;

pub use error::StorageError;
pub(crate) use error::{
    ClearDirSnafu, CreateDirSnafu, InvalidLocationSnafu, ListDirSnafu, ResolveRootSnafu,
};

/// General result type used by storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Root of a dataset hierarchy (input root or output root).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageLocation {
    /// A hierarchy on the local filesystem rooted at the given path.
    Local(PathBuf),
    // Future:
    // S3 { bucket: String, prefix: String },
}

impl StorageLocation {
    /// Creates a new `StorageLocation` for a local filesystem path.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        StorageLocation::Local(root.into())
    }

    /// Parse a user-facing location string.
    ///
    /// v0.1: only local filesystem paths are supported; URL-style locations
    /// (`s3a://bucket/`) are rejected.
    pub fn parse(spec: &str) -> StorageResult<Self> {
        let trimmed = spec.trim();
        ensure!(
            !trimmed.is_empty(),
            InvalidLocationSnafu {
                spec,
                reason: "location is empty",
            }
        );

        if let Some((scheme, _)) = trimmed.split_once("://") {
            return InvalidLocationSnafu {
                spec,
                reason: format!("unsupported scheme '{scheme}' (only local paths in v0.1)"),
            }
            .fail();
        }

        Ok(StorageLocation::Local(PathBuf::from(trimmed)))
    }

    /// Resolve a path relative to this location into an absolute local path.
    pub fn resolve(&self, rel: &Path) -> PathBuf {
        join_local(self, rel)
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageLocation::Local(root) => write!(f, "{}", root.display()),
        }
    }
}

/// Join a storage location with a relative path into an absolute local path.
///
/// v0.1: only Local is supported.
fn join_local(location: &StorageLocation, rel: &Path) -> PathBuf {
    match location {
        StorageLocation::Local(root) => root.join(rel),
    }
}

/// How deep below a hierarchy root record files are expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileDepth {
    /// Files sit exactly this many directory levels below the root
    /// (`0` means directly inside the root).
    Exactly(usize),
    /// Files may sit at any depth.
    Any,
}

impl FileDepth {
    fn accepts_file_at(self, depth: usize) -> bool {
        match self {
            FileDepth::Exactly(n) => depth == n,
            FileDepth::Any => true,
        }
    }

    fn descends_past(self, depth: usize) -> bool {
        match self {
            FileDepth::Exactly(n) => depth < n,
            FileDepth::Any => true,
        }
    }
}

/// List the record files (`*.<ext>`) under `rel_dir` within `location`.
///
/// Returns absolute paths sorted lexicographically so repeated runs see the
/// same file order. A missing `rel_dir` yields an empty list: an absent input
/// hierarchy is treated as "no records", not as an error. Hidden entries
/// (names starting with `.` or `_`) are skipped, matching what Spark-style
/// writers leave behind (`_SUCCESS`, `.crc` files).
///
/// # Errors
///
/// Returns `StorageError::ListDir` if a directory exists but cannot be read.
pub async fn list_record_files(
    location: &StorageLocation,
    rel_dir: &Path,
    depth: FileDepth,
    extension: &str,
) -> StorageResult<Vec<PathBuf>> {
    let root = join_local(location, rel_dir);

    match fs::metadata(&root).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Ok(Vec::new()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).context(ListDirSnafu {
                path: root.display().to_string(),
            });
        }
    }

    let mut found = Vec::new();
    let mut pending = vec![(root, 0usize)];

    while let Some((dir, level)) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await.context(ListDirSnafu {
            path: dir.display().to_string(),
        })?;

        while let Some(entry) = entries.next_entry().await.context(ListDirSnafu {
            path: dir.display().to_string(),
        })?
        {
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }

            let file_type = entry.file_type().await.context(ListDirSnafu {
                path: path.display().to_string(),
            })?;

            if file_type.is_dir() {
                if depth.descends_past(level) {
                    pending.push((path, level + 1));
                }
            } else if depth.accepts_file_at(level) && has_extension(&path, extension) {
                found.push(path);
            }
        }
    }

    found.sort();
    debug!(
        "Discovered {} record file(s) under {} ({depth:?})",
        found.len(),
        join_local(location, rel_dir).display()
    );
    Ok(found)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.') || n.starts_with('_'))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == extension)
}

/// Remove everything under `rel_dir` within `location` and recreate it empty.
///
/// Used before a table is rewritten so the previous run's files are replaced
/// rather than accumulated. Returns `true` if prior contents were removed.
pub async fn reset_dir(location: &StorageLocation, rel_dir: &Path) -> StorageResult<bool> {
    let abs = join_local(location, rel_dir);

    let existed = match fs::remove_dir_all(&abs).await {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            return Err(e).context(ClearDirSnafu {
                path: abs.display().to_string(),
            });
        }
    };

    fs::create_dir_all(&abs).await.context(CreateDirSnafu {
        path: abs.display().to_string(),
    })?;

    if existed {
        debug!("Removed previous contents of {}", abs.display());
    }
    Ok(existed)
}

/// Return a copy of `location` whose root is an absolute path.
///
/// DataFusion resolves relative paths against its own working directory, so
/// stages hand it absolute paths only.
pub fn absolute(location: &StorageLocation) -> StorageResult<StorageLocation> {
    match location {
        StorageLocation::Local(root) => {
            let abs = std::path::absolute(root).context(ResolveRootSnafu {
                path: root.display().to_string(),
            })?;
            Ok(StorageLocation::Local(abs))
        }
    }
}
