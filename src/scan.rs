//! Folder index builder.
//!
//! Walks one level of the uploads root and turns every visible subdirectory
//! into a [`Folder`]. The scan runs fresh for every request, so the result
//! always reflects the live filesystem.
//!
//! ## Directory Structure
//!
//! ```text
//! static/uploads/              # Uploads root
//! ├── .thumbs/                 # Dot-prefixed: skipped
//! ├── notes.txt                # Not a directory: skipped
//! ├── summer-2024/             # Folder "summer-2024"
//! │   ├── IMG_0001.JPG         # Qualifying (case-insensitive extension)
//! │   ├── IMG_0002.png
//! │   └── readme.md            # Ignored
//! └── empty/                   # Folder with no images, cover = ""
//! ```
//!
//! ## Cover Selection
//!
//! The cover is the qualifying image with the largest byte size. When several
//! images share the largest size, the one the filesystem enumerated first
//! wins. Size only decides the cover: `images` keeps enumeration order.
//!
//! ## Parallelism
//!
//! Sibling folders and the per-image stat calls fan out on the rayon pool.
//! Both passes collect back into enumeration order, so the output is
//! identical to a sequential scan.
//!
//! ## Failure
//!
//! Any I/O error (missing root, permission denied, failed stat) aborts the
//! whole scan with a single [`ScanError`]. There are no partial results.

use crate::types::Folder;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read directory {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("failed to stat {path}: {source}")]
    Stat { path: PathBuf, source: io::Error },
}

impl ScanError {
    /// The filesystem path the failing operation was applied to.
    pub fn path(&self) -> &Path {
        match self {
            ScanError::ReadDir { path, .. } | ScanError::Stat { path, .. } => path,
        }
    }
}

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Build the folder index for `root`.
///
/// Image paths are rendered as `<url_prefix>/<folder>/<file>`.
pub fn scan_folders(root: &Path, url_prefix: &str) -> Result<Vec<Folder>, ScanError> {
    let candidates: Vec<(String, PathBuf)> = list_dir(root)?
        .into_iter()
        .filter(|(name, _)| !name.starts_with('.'))
        .collect();

    let folders = candidates
        .par_iter()
        .map(|(name, path)| scan_folder(name, path, url_prefix))
        .collect::<Result<Vec<_>, _>>()?;

    let folders: Vec<Folder> = folders.into_iter().flatten().collect();
    tracing::debug!(root = %root.display(), folders = folders.len(), "scanned uploads root");
    Ok(folders)
}

/// Scan one root entry. Returns `None` when the entry is not a directory.
fn scan_folder(name: &str, path: &Path, url_prefix: &str) -> Result<Option<Folder>, ScanError> {
    let meta = stat(path)?;
    if !meta.is_dir() {
        return Ok(None);
    }

    let candidates: Vec<(String, PathBuf)> = list_dir(path)?
        .into_iter()
        .filter(|(file_name, _)| is_qualifying_image(file_name))
        .collect();

    // Stat pass: sizes and a file check in one call per image.
    let stats = candidates
        .par_iter()
        .map(|(file_name, file_path)| stat(file_path).map(|m| (file_name, m)))
        .collect::<Result<Vec<_>, _>>()?;

    let sized: Vec<(String, u64)> = stats
        .into_iter()
        .filter(|(_, meta)| meta.is_file())
        .map(|(file_name, meta)| (image_path(url_prefix, name, file_name), meta.len()))
        .collect();

    let cover_image = pick_cover(&sized).unwrap_or_default().to_string();
    let images = sized.into_iter().map(|(p, _)| p).collect();

    Ok(Some(Folder {
        name: name.to_string(),
        cover_image,
        images,
    }))
}

/// Direct entries of `dir` as `(file name, full path)`, in enumeration order.
fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>, ScanError> {
    let read_dir_err = |source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    fs::read_dir(dir)
        .map_err(read_dir_err)?
        .map(|entry| -> Result<(String, PathBuf), ScanError> {
            let entry = entry.map_err(read_dir_err)?;
            Ok((entry.file_name().to_string_lossy().into_owned(), entry.path()))
        })
        .collect()
}

/// `fs::metadata` follows symlinks, so a linked folder counts as a folder.
fn stat(path: &Path) -> Result<fs::Metadata, ScanError> {
    fs::metadata(path).map_err(|source| ScanError::Stat {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether a file name carries one of [`IMAGE_EXTENSIONS`], ignoring case.
pub fn is_qualifying_image(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Site-relative path under which an image is served.
pub fn image_path(url_prefix: &str, folder: &str, file: &str) -> String {
    format!("{url_prefix}/{folder}/{file}")
}

/// Pick the largest entry; the earliest one wins a tie.
pub fn pick_cover(sized: &[(String, u64)]) -> Option<&str> {
    let mut best: Option<&(String, u64)> = None;
    for entry in sized {
        if best.is_none_or(|b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|(path, _)| path.as_str())
}
