use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Fetch-related constants
// =============================================================================

/// Maximum number of registry requests in flight at once
pub const MAX_CONCURRENT_FETCHES: usize = 30;

/// Timeout for a single package fetch (30 seconds)
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// How long fetched package metadata stays in the cache (48 hours)
pub const CACHE_TTL_HOURS: i64 = 48;

/// Cache namespace for package metadata
pub const PACKAGES_CACHE_NAME: &str = "packages";

// =============================================================================
// Policy file
// =============================================================================

/// Policy file names looked up in the scanned root, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["depshub.yaml", "depshub.yml"];

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "DEPSHUB_LOG";

/// Returns the path to the cache directory for depshub.
/// Uses $XDG_CACHE_HOME/depshub if XDG_CACHE_HOME is set,
/// otherwise falls back to ~/.cache/depshub,
/// or ./depshub if neither is available.
pub fn cache_dir() -> PathBuf {
    cache_dir_with_env(std::env::var("XDG_CACHE_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the JSON file backing a cache namespace.
pub fn cache_path(name: &str) -> PathBuf {
    cache_dir().join(format!("{name}.json"))
}

fn cache_dir_with_env(xdg_cache_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let cache_dir = xdg_cache_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."));

    cache_dir.join("depshub")
}
