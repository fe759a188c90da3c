use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::common::io::{FileData, map_or_read, open_noatime};

use super::core::convert_bytes;

/// Fatal conversion failures, one variant per failing step. All carry
/// the path involved; none are retried.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot open {}: {}", .path.display(), crate::common::io_error_msg(.source))]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot stat {}: {}", .path.display(), crate::common::io_error_msg(.source))]
    Stat { path: PathBuf, source: io::Error },

    #[error("cannot map {}: {}", .path.display(), crate::common::io_error_msg(.source))]
    Map { path: PathBuf, source: io::Error },

    #[error("write error on {}: {}", .path.display(), crate::common::io_error_msg(.source))]
    Write { path: PathBuf, source: io::Error },

    #[error(
        "cannot replace {} with {}: {} (converted output left at {})",
        .path.display(), .tmp.display(), crate::common::io_error_msg(.source), .tmp.display()
    )]
    Rename {
        path: PathBuf,
        tmp: PathBuf,
        source: io::Error,
    },
}

/// Load the whole source file. Returns None for a zero-length input —
/// an empty region must never be mapped.
fn load_source(path: &Path) -> Result<Option<FileData>, ConvertError> {
    let file = open_noatime(path).map_err(|source| ConvertError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = file.metadata().map_err(|source| ConvertError::Stat {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() == 0 {
        return Ok(None);
    }
    let data = map_or_read(&file, &metadata).map_err(|source| ConvertError::Map {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(data))
}

/// Scratch name for in-place conversion: `<path>_tmp` alongside the
/// original, so the final rename never crosses a filesystem.
fn scratch_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push("_tmp");
    PathBuf::from(name)
}

/// Convert `src` into a newly created (or truncated) `dst`, leaving
/// `src` untouched. An empty source yields an empty `dst`.
pub fn convert_to_file(src: &Path, dst: &Path) -> Result<(), ConvertError> {
    // Acquire the source in full before touching the destination.
    let data = load_source(src)?;

    let mut out = File::create(dst).map_err(|source| ConvertError::Open {
        path: dst.to_path_buf(),
        source,
    })?;

    if let Some(data) = data {
        convert_bytes(&data, &mut out).map_err(|source| ConvertError::Write {
            path: dst.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Convert `path` in place: write the result to `<path>_tmp`, then
/// atomically rename it over the original. An empty input is a no-op —
/// no scratch file is ever created for it.
///
/// If the conversion itself fails, the partial scratch file is removed
/// (best effort). If only the final rename fails, the scratch file is
/// kept: at that point it holds the complete converted output.
pub fn convert_in_place(path: &Path) -> Result<(), ConvertError> {
    let Some(data) = load_source(path)? else {
        return Ok(());
    };

    let tmp = scratch_path(path);
    let mut out = File::create(&tmp).map_err(|source| ConvertError::Open {
        path: tmp.clone(),
        source,
    })?;

    if let Err(source) = convert_bytes(&data, &mut out) {
        drop(out);
        let _ = fs::remove_file(&tmp);
        return Err(ConvertError::Write { path: tmp, source });
    }

    // Release the mapping and the output handle before replacing the file.
    drop(data);
    drop(out);

    fs::rename(&tmp, path).map_err(|source| ConvertError::Rename {
        path: path.to_path_buf(),
        tmp,
        source,
    })
}
