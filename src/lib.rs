//! # Gallery Folders
//!
//! A filesystem-backed folder index for a photo gallery, served as JSON.
//! The uploads directory is the data source: every visible subdirectory is a
//! gallery folder, and its largest image is the folder's cover.
//!
//! ```text
//! static/uploads/
//! ├── summer-2024/        →  { "name": "summer-2024",
//! │   ├── a.jpg (100 B)          "coverImage": "/uploads/summer-2024/b.jpg",
//! │   ├── b.jpg (500 B)          "images": ["/uploads/summer-2024/a.jpg",
//! │   └── c.png (300 B)                     "/uploads/summer-2024/b.jpg",
//! └── .cache/  (skipped)                    "/uploads/summer-2024/c.png"] }
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Folder index builder: directory listing, extension filter, cover selection |
//! | [`types`] | The serialized [`types::Folder`] record |
//! | [`api`] | `GET /api/gallery/folders` handler and its error mapping |
//! | [`http`] | Minimal HTTP/1.1 request parsing and response writing |
//! | [`server`] | Router and thread-per-connection listener; also serves upload bytes |
//! | [`config`] | `gallery.toml` loading, merging over defaults, and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | Text rendering of the index for the `list` command |
//!
//! # Design Decisions
//!
//! ## Scan Per Request
//!
//! Nothing is cached. Every request rescans the uploads root, so adding or
//! removing a folder shows up immediately with no invalidation logic. Keep the
//! tree small enough that a full rescan is cheap.
//!
//! ## All-Or-Nothing Errors
//!
//! One unreadable folder or failed stat fails the whole request with a 500.
//! The client never sees a partial index or any filesystem path; the detail
//! goes to the server log.
//!
//! ## Cover Tie-Break
//!
//! Among images of equal (maximal) size, the first one in directory
//! enumeration order is the cover.

pub mod api;
pub mod config;
pub mod http;
pub mod logging;
pub mod output;
pub mod scan;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
