//! `.modscore.toml` configuration.
//!
//! Every section and field is optional. A file that fails to parse during
//! discovery is reported and replaced by defaults; a file named explicitly
//! with `--config` must parse.

mod core;
mod loader;
mod parallel;

pub use self::core::{FeaturesConfig, ModscoreConfig, ScanConfig, ScoringConfig};
pub use loader::{directory_ancestors, discover_config, load_config, parse_config, CONFIG_FILE_NAME};
pub use parallel::ParallelConfig;
