//! Logging initialization
//!
//! Logs go to stderr so reports on stdout stay clean. The filter defaults to
//! `tablewatch=info` and can be overridden through `RUST_LOG`.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Log output style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines
    #[default]
    Human,
    /// One JSON object per event, for log collectors
    Json,
}

const DEFAULT_FILTER: &str = "tablewatch=info";

static INIT_ONCE: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr);
        // Another subscriber may already be installed (e.g. by a test harness)
        let _ = match profile {
            Profile::Human => builder.try_init(),
            Profile::Json => builder.json().try_init(),
        };
    });
}
