//! Default configuration values

/// Project configuration file name
pub const CONFIG_FILE: &str = "mfe.toml";

/// Scope prefix shared by every local package name
pub const DEFAULT_SCOPE: &str = "@vue-mfe";

/// Artifact directory, relative to the project root
pub const DEFAULT_DIST: &str = "dist";

/// Asset directory inside the artifact directory
pub const DEFAULT_ASSETS: &str = "assets";

/// Directory holding the local source packages
pub const PACKAGES_DIR: &str = "packages";

/// Directory holding installed vendor packages
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Persisted manifest file name
pub const META_FILE: &str = "meta.json";

/// Emitted HTML shell file name
pub const HTML_FILE: &str = "index.html";

/// Identifier of the synthetic vendor re-export entry
pub const VENDOR_ENTRY: &str = "vendor";

/// Marker replaced by the import map when the container is rebuilt
pub const PLACEHOLDER: &str = "<!-- mfe placeholder -->";

/// Source extensions picked up on a first run
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "vue"];

/// Default `main` of a package.json without one
pub const DEFAULT_MAIN: &str = "index.js";

/// Maximum number of remote fetch attempts
pub const MAX_FETCH_RETRIES: u32 = 3;

/// Base delay between remote fetch attempts (in milliseconds)
pub const FETCH_RETRY_DELAY_MS: u64 = 500;

/// Default bundler command
pub const DEFAULT_BUNDLER: &[&str] = &["node", "scripts/bundle.mjs"];
