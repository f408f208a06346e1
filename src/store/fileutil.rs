//! Atomic file replacement shared by the durable registries.
//!
//! A registry file is never written in place: content goes to a fresh temp
//! file in the destination directory which is then renamed over the
//! destination, so a crash mid-write leaves the previous content intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use super::errors::StoreResult;

/// Resolves a symlinked destination to its target so the rename replaces the
/// real file instead of the link itself.
pub fn resolve_destination(path: &Path) -> PathBuf {
    fs::read_link(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Replaces the file at `path` with `data` atomically.
///
/// The temp file is created in the destination directory (rename does not
/// cross filesystems) and is removed automatically if anything fails before
/// the rename. Ownership and permission bits of an existing destination are
/// carried over on a best-effort basis.
pub fn replace_atomic(path: &Path, data: &[u8]) -> StoreResult<()> {
    let target = resolve_destination(path);
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(data)?;
    temp.flush()?;

    copy_file_permissions(&target, temp.path());
    temp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

/// Encodes `value` as tab-indented JSON, the registry file format.
pub fn to_tab_json<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut buf = Vec::with_capacity(256);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Copies file ownership and permissions from `src` onto `dst`, ignoring any
/// error along the way. A missing `src` (first save) is the common case.
#[cfg(unix)]
pub fn copy_file_permissions(src: &Path, dst: &Path) {
    use std::os::unix::fs::MetadataExt;

    let Ok(meta) = fs::metadata(src) else {
        return;
    };
    if meta.is_file() && fs::set_permissions(dst, meta.permissions()).is_err() {
        return;
    }
    let (uid, gid) = (meta.uid(), meta.gid());
    if uid > 0 && gid > 0 {
        let _ = std::os::unix::fs::chown(dst, Some(uid), Some(gid));
    }
}

#[cfg(not(unix))]
pub fn copy_file_permissions(_src: &Path, _dst: &Path) {}
