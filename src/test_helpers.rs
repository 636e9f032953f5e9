//! Shared test utilities for the gallery-folders test suite.
//!
//! Fixture builders that lay out an uploads root on disk, plus lookups that
//! panic with a readable message on a miss.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let dir = make_folder(tmp.path(), "summer");
//! write_image(&dir, "a.jpg", 100);
//!
//! let folders = scan_folders(tmp.path(), "/uploads").unwrap();
//! let summer = find_folder(&folders, "summer");
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Folder;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create `root/name` and return its path.
pub fn make_folder(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a fake image of exactly `size` bytes. Only the extension and the
/// byte length matter to the scanner.
pub fn write_image(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, vec![0xAB; size]).unwrap();
    path
}

/// File names in `dir`, in the order the filesystem enumerates them.
///
/// Enumeration order is platform-dependent, so tests that assert on order
/// compare against this rather than against creation order.
pub fn enumeration_order(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

// =========================================================================
// Lookups
// =========================================================================

/// Find a folder by name. Panics if not found.
pub fn find_folder<'a>(folders: &'a [Folder], name: &str) -> &'a Folder {
    folders.iter().find(|f| f.name == name).unwrap_or_else(|| {
        let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
        panic!("folder '{name}' not found. Available: {names:?}")
    })
}
