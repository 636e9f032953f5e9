//! Server configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml`. Stock defaults are
//! overridden by whatever the user file sets; everything is optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! uploads_dir = "static/uploads"  # Root scanned for gallery folders
//! url_prefix = "/uploads"         # Site path the uploads root is served under
//!
//! [server]
//! bind = "127.0.0.1:8080"         # Listen address
//! read_timeout_secs = 5           # Per-connection socket read timeout
//!
//! [processing]
//! max_threads = 4                 # Scan workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:3000"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `gallery.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Directory whose subdirectories become gallery folders.
    pub uploads_dir: PathBuf,
    /// Site path under which `uploads_dir` is reachable. Leading `/`, no
    /// trailing `/`.
    pub url_prefix: String,
    /// Listener settings.
    pub server: ServerConfig,
    /// Parallel scan settings.
    pub processing: ProcessingConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("static/uploads"),
            url_prefix: "/uploads".to_string(),
            server: ServerConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "url_prefix must start with '/'".into(),
            ));
        }
        if self.url_prefix.len() > 1 && self.url_prefix.ends_with('/') {
            return Err(ConfigError::Validation(
                "url_prefix must not end with '/'".into(),
            ));
        }
        if self.url_prefix == "/" || self.url_prefix.starts_with("/api/") {
            return Err(ConfigError::Validation(
                "url_prefix must not shadow the API routes".into(),
            ));
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            )));
        }
        if self.server.read_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "server.read_timeout_secs must be non-zero".into(),
            ));
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on. Port `0` picks a free port.
    pub bind: String,
    /// Socket read timeout for each connection, in seconds.
    pub read_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            read_timeout_secs: 5,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Parallel scan settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of scan worker threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

impl ProcessingConfig {
    /// Scan workers to start: `max_threads` capped at the core count, or all
    /// cores when unset.
    pub fn worker_threads(&self) -> usize {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        match self.max_threads {
            Some(n) => n.min(cores),
            None => cores,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// `GalleryConfig::default()` as a TOML table, the base every user file is
/// laid over.
pub fn stock_defaults_table() -> Result<toml::Table, ConfigError> {
    match toml::Value::try_from(GalleryConfig::default()) {
        Ok(toml::Value::Table(table)) => Ok(table),
        Ok(other) => Err(ConfigError::Validation(format!(
            "default config serialized to a {} instead of a table",
            other.type_str()
        ))),
        Err(e) => Err(ConfigError::Validation(format!(
            "default config must serialize: {e}"
        ))),
    }
}

/// Lay the user's table over the defaults in place. Sections recurse so a
/// sparse `[server]` keeps the default keys it does not mention; any other
/// value the user sets wins outright.
pub fn overlay_table(defaults: &mut toml::Table, user: toml::Table) {
    for (key, value) in user {
        if let toml::Value::Table(user_section) = value {
            if let Some(toml::Value::Table(section)) = defaults.get_mut(&key) {
                overlay_table(section, user_section);
            } else {
                defaults.insert(key, toml::Value::Table(user_section));
            }
        } else {
            defaults.insert(key, value);
        }
    }
}

/// Read `path` as a TOML table. A missing file is `Ok(None)`; the caller then
/// runs on stock defaults.
pub fn read_user_table(path: &Path) -> Result<Option<toml::Table>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(content.parse::<toml::Table>()?))
}

/// Lay an optional user table over the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(user: Option<toml::Table>) -> Result<GalleryConfig, ConfigError> {
    let mut table = stock_defaults_table()?;
    if let Some(user) = user {
        overlay_table(&mut table, user);
    }
    let config: GalleryConfig = toml::Value::Table(table).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    resolve_config(read_user_table(path)?)
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Gallery Folders Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory whose subdirectories become gallery folders.
# Hidden (dot-prefixed) entries and plain files in it are ignored.
uploads_dir = "static/uploads"

# Site path the uploads directory is served under. Image paths in the
# folder index are built as <url_prefix>/<folder>/<file>.
url_prefix = "/uploads"

# ---------------------------------------------------------------------------
# HTTP listener
# ---------------------------------------------------------------------------
[server]
# Address to listen on. Use port 0 to let the OS pick one.
bind = "127.0.0.1:8080"

# Socket read timeout per connection, in seconds.
read_timeout_secs = 5

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum scan worker threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_expected_values() {
        let config = GalleryConfig::default();
        assert_eq!(config.uploads_dir, PathBuf::from("static/uploads"));
        assert_eq!(config.url_prefix, "/uploads");
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.server.read_timeout_secs, 5);
        assert_eq!(config.processing.max_threads, None);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(GalleryConfig::default().validate().is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("gallery.toml")).unwrap();
        assert_eq!(config.url_prefix, "/uploads");
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gallery.toml");
        fs::write(
            &path,
            r#"
uploads_dir = "/srv/photos"

[server]
bind = "0.0.0.0:3000"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.uploads_dir, PathBuf::from("/srv/photos"));
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        // Untouched keys keep defaults
        assert_eq!(config.server.read_timeout_secs, 5);
        assert_eq!(config.url_prefix, "/uploads");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gallery.toml");
        fs::write(&path, "[server]\nport = 8080\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gallery.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn validate_rejects_bad_prefix() {
        for prefix in ["uploads", "/uploads/", "/", "/api/gallery"] {
            let config = GalleryConfig {
                url_prefix: prefix.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "prefix {prefix:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_rejects_bad_bind() {
        let mut config = GalleryConfig::default();
        config.server.bind = "localhost".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_zero_timeout_and_threads() {
        let mut config = GalleryConfig::default();
        config.server.read_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = GalleryConfig::default();
        config.processing.max_threads = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn sparse_server_section_keeps_default_timeout() {
        let mut table = stock_defaults_table().unwrap();
        overlay_table(&mut table, "[server]\nbind = \"0.0.0.0:1\"\n".parse().unwrap());
        assert_eq!(table["server"]["bind"].as_str(), Some("0.0.0.0:1"));
        assert_eq!(table["server"]["read_timeout_secs"].as_integer(), Some(5));
        assert_eq!(table["url_prefix"].as_str(), Some("/uploads"));
    }

    #[test]
    fn scalar_over_section_replaces_it() {
        let mut table = stock_defaults_table().unwrap();
        overlay_table(&mut table, "server = 3\n".parse().unwrap());
        assert_eq!(table["server"].as_integer(), Some(3));
    }

    #[test]
    fn config_path_that_is_a_directory_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn worker_threads_never_exceed_cores() {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        let capped = ProcessingConfig {
            max_threads: Some(cores + 100),
        };
        assert_eq!(capped.worker_threads(), cores);
        assert_eq!(ProcessingConfig::default().worker_threads(), cores);
        let single = ProcessingConfig {
            max_threads: Some(1),
        };
        assert_eq!(single.worker_threads(), 1);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let table: toml::Table = stock_config_toml().parse().unwrap();
        let config = resolve_config(Some(table)).unwrap();
        let defaults = GalleryConfig::default();
        assert_eq!(config.uploads_dir, defaults.uploads_dir);
        assert_eq!(config.url_prefix, defaults.url_prefix);
        assert_eq!(config.server.bind, defaults.server.bind);
        assert_eq!(config.server.read_timeout_secs, defaults.server.read_timeout_secs);
    }
}
