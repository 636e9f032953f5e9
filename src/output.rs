//! CLI output formatting for the folder index.
//!
//! # Output Format
//!
//! ```text
//! 001 summer-2024 (3 images)
//!     * IMG_0002.png
//!       IMG_0001.JPG
//!       IMG_0003.gif
//! 002 drafts (no images)
//!
//! 2 folders, 3 images
//! ```
//!
//! The cover image is marked with `*`. Images are listed in the order the
//! index holds them, which is filesystem enumeration order.
//!
//! # Architecture
//!
//! [`format_folders`] returns `Vec<String>` for testability and
//! [`print_folders`] writes it to stdout. The format function is pure.

use crate::types::Folder;

const IMAGE_INDENT: &str = "    ";

/// Last path segment of a site-relative image path.
fn file_name(image_path: &str) -> &str {
    image_path.rsplit('/').next().unwrap_or(image_path)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn folder_header(index: usize, folder: &Folder) -> String {
    let count = match folder.images.len() {
        0 => "no images".to_string(),
        n => plural(n, "image", "images"),
    };
    format!("{index:03} {} ({count})", folder.name)
}

pub fn format_folders(folders: &[Folder]) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, folder) in folders.iter().enumerate() {
        lines.push(folder_header(i + 1, folder));
        // Cover first, then the rest in index order
        if folder.has_cover() {
            lines.push(format!("{IMAGE_INDENT}* {}", file_name(&folder.cover_image)));
        }
        for image in folder.images.iter().filter(|p| **p != folder.cover_image) {
            lines.push(format!("{IMAGE_INDENT}  {}", file_name(image)));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let total: usize = folders.iter().map(|f| f.images.len()).sum();
    lines.push(format!(
        "{}, {}",
        plural(folders.len(), "folder", "folders"),
        plural(total, "image", "images")
    ));
    lines
}

pub fn print_folders(folders: &[Folder]) {
    for line in format_folders(folders) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(name: &str, cover: &str, images: &[&str]) -> Folder {
        Folder {
            name: name.to_string(),
            cover_image: cover.to_string(),
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn formats_cover_first_then_remaining_images() {
        let folders = vec![folder(
            "summer",
            "/uploads/summer/b.jpg",
            &["/uploads/summer/a.jpg", "/uploads/summer/b.jpg", "/uploads/summer/c.jpg"],
        )];
        let lines = format_folders(&folders);
        assert_eq!(
            lines,
            vec![
                "001 summer (3 images)",
                "    * b.jpg",
                "      a.jpg",
                "      c.jpg",
                "",
                "1 folder, 3 images",
            ]
        );
    }

    #[test]
    fn empty_folder_says_no_images() {
        let lines = format_folders(&[folder("drafts", "", &[])]);
        assert_eq!(lines[0], "001 drafts (no images)");
        assert_eq!(lines.last().unwrap(), "1 folder, 0 images");
    }

    #[test]
    fn empty_index_prints_only_summary() {
        assert_eq!(format_folders(&[]), vec!["0 folders, 0 images"]);
    }

    #[test]
    fn single_image_is_singular() {
        let lines = format_folders(&[folder("one", "/u/one/x.gif", &["/u/one/x.gif"])]);
        assert_eq!(lines[0], "001 one (1 image)");
        assert_eq!(lines.last().unwrap(), "1 folder, 1 image");
    }
}
