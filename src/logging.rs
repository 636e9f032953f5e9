//! Logging bootstrap.
//!
//! Installs a `tracing-subscriber` fmt layer writing to stderr. The filter
//! directive comes from `GALLERY_LOG`, then `RUST_LOG`, then the level passed
//! in. Safe to call more than once; only the first call installs anything.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

const ENV_FILTER_VARS: [&str; 2] = ["GALLERY_LOG", "RUST_LOG"];

static INSTALLED: OnceLock<()> = OnceLock::new();

/// First non-empty filter directive found in the environment.
fn env_directive() -> Option<String> {
    ENV_FILTER_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .filter(|directive| !directive.trim().is_empty())
}

fn build_filter(directive: Option<&str>, default_level: LevelFilter) -> EnvFilter {
    let fallback = || EnvFilter::default().add_directive(default_level.into());
    match directive {
        Some(d) => EnvFilter::try_new(d).unwrap_or_else(|e| {
            eprintln!("ignoring invalid log filter {d:?}: {e}");
            fallback()
        }),
        None => fallback(),
    }
}

/// Install the global subscriber.
pub fn init(default_level: LevelFilter) {
    INSTALLED.get_or_init(|| {
        let filter = build_filter(env_directive().as_deref(), default_level);
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        // Another subscriber may already be set (e.g. by an embedding test harness).
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init();
    });
}
