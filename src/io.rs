//! File preparation and default directory policy for the persisted DAG file
//! (spec §4.H, §6). This module is the concrete realization of what spec.md
//! treats as an external collaborator: a real library needs *some* default
//! implementation, not just an interface.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{EtchashError, Result};
use crate::primitives::H256;

pub const MAGIC_SIZE: u64 = 8;
pub const ETCHASH_DAG_MAGIC_NUM: [u8; 8] = *b"ETCHDAG\0";

/// Outcome of [`prepare`], mirroring spec §4.H step 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareStatus {
    /// File exists, correct size, magic already present.
    Match,
    /// File existed with a different length; it was force-recreated and must
    /// be re-prepared (the retry is expected to report `Mismatch`).
    SizeMismatch,
    /// File exists (freshly created or pre-existing) with no/invalid magic;
    /// its body must be rebuilt.
    Mismatch,
}

/// Deterministic on-disk path for a DAG file given a directory and seed
/// hash. Exposed so callers can locate or clean up DAG files without
/// duplicating the naming convention.
pub fn path_for(dirname: &Path, seed_hash: &H256) -> PathBuf {
    let mut name = String::from("etchash-dag-");
    for byte in &seed_hash[..8] {
        name.push_str(&format!("{byte:02x}"));
    }
    dirname.join(name)
}

/// Resolves the default per-user cache directory for DAG files, the way a
/// mining driver would pick one without being told explicitly (spec §6
/// `default_dirname`).
pub fn default_dirname() -> Option<PathBuf> {
    dirs::cache_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join("etchash-dags"))
}

fn read_magic(file: &mut File) -> std::io::Result<Option<[u8; 8]>> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = [0u8; 8];
    match file.read_exact(&mut buf) {
        Ok(()) => Ok(Some(buf)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// Prepares the DAG file at a path derived from `dirname` and `seed_hash`.
///
/// On success returns the open file handle plus the status describing what
/// the caller must do next: `Match` means the body is already valid and
/// ready to mmap; `Mismatch` (including the forced retry after
/// `SizeMismatch`) means the caller must run [`crate::dag::compute_full_data`]
/// into the mapped region and then call [`finalize`].
pub fn prepare(
    dirname: &Path,
    seed_hash: &H256,
    full_size: u64,
    force_create: bool,
) -> Result<(File, PrepareStatus)> {
    fs::create_dir_all(dirname).map_err(|source| EtchashError::IoFailure {
        context: "creating DAG directory",
        source,
    })?;
    let path = path_for(dirname, seed_hash);

    if force_create {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| EtchashError::IoFailure {
                context: "force-creating DAG file",
                source,
            })?;
        file.set_len(full_size).map_err(|source| EtchashError::IoFailure {
            context: "sizing DAG file",
            source,
        })?;
        return Ok((file, PrepareStatus::Mismatch));
    }

    let existed = path.exists();
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(&path)
        .map_err(|source| EtchashError::IoFailure {
            context: "opening DAG file",
            source,
        })?;

    let len = file.metadata().map_err(|source| EtchashError::IoFailure {
        context: "reading DAG file metadata",
        source,
    })?.len();

    if !existed || len != full_size {
        file.set_len(full_size).map_err(|source| EtchashError::IoFailure {
            context: "sizing DAG file",
            source,
        })?;
        let status = if existed && len != full_size {
            PrepareStatus::SizeMismatch
        } else {
            PrepareStatus::Mismatch
        };
        return Ok((file, status));
    }

    let magic = read_magic(&mut file).map_err(|source| EtchashError::IoFailure {
        context: "reading DAG magic number",
        source,
    })?;
    if magic == Some(ETCHASH_DAG_MAGIC_NUM) {
        Ok((file, PrepareStatus::Match))
    } else {
        Ok((file, PrepareStatus::Mismatch))
    }
}

/// Writes the magic number after the DAG body has been filled, publishing
/// the file as valid to future `prepare` calls. Upgraded to `sync_data`
/// before the magic write for a stronger crash guarantee than the reference
/// `fflush` — spec §9 explicitly permits this while keeping the on-disk
/// layout unchanged.
pub fn finalize(file: &mut File) -> Result<()> {
    use std::io::Write;

    file.sync_data().map_err(|source| EtchashError::IoFailure {
        context: "flushing DAG body before finalize",
        source,
    })?;
    file.seek(SeekFrom::Start(0)).map_err(|source| EtchashError::IoFailure {
        context: "seeking to DAG file start",
        source,
    })?;
    file.write_all(&ETCHASH_DAG_MAGIC_NUM).map_err(|source| EtchashError::IoFailure {
        context: "writing DAG magic number",
        source,
    })?;
    file.sync_data().map_err(|source| EtchashError::IoFailure {
        context: "flushing DAG magic number",
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_creates_then_matches_after_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let seed = [1u8; 32];
        let full_size = MAGIC_SIZE + 256;

        let (mut file, status) = prepare(dir.path(), &seed, full_size, false).unwrap();
        assert_eq!(status, PrepareStatus::Mismatch);
        finalize(&mut file).unwrap();
        drop(file);

        let (_file, status) = prepare(dir.path(), &seed, full_size, false).unwrap();
        assert_eq!(status, PrepareStatus::Match);
    }

    #[test]
    fn prepare_detects_size_mismatch_and_force_recreates() {
        let dir = tempfile::tempdir().unwrap();
        let seed = [2u8; 32];
        let full_size = MAGIC_SIZE + 256;

        let (mut file, _) = prepare(dir.path(), &seed, full_size, false).unwrap();
        finalize(&mut file).unwrap();
        drop(file);

        let (_file, status) = prepare(dir.path(), &seed, full_size + 64, false).unwrap();
        assert_eq!(status, PrepareStatus::SizeMismatch);

        let (_file, status) = prepare(dir.path(), &seed, full_size + 64, false).unwrap();
        assert_eq!(status, PrepareStatus::Mismatch);
    }

    // Truncating the magic forces a rebuild on next prepare.
    #[test]
    fn truncated_magic_is_treated_as_mismatch() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let seed = [3u8; 32];
        let full_size = MAGIC_SIZE + 256;

        let (mut file, _) = prepare(dir.path(), &seed, full_size, false).unwrap();
        finalize(&mut file).unwrap();
        drop(file);

        let mut file = OpenOptions::new()
            .write(true)
            .open(path_for(dir.path(), &seed))
            .unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.write_all(&[0u8; 8]).unwrap();
        drop(file);

        let (_file, status) = prepare(dir.path(), &seed, full_size, false).unwrap();
        assert_eq!(status, PrepareStatus::Mismatch);
    }
}
