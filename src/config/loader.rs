use std::fs;
use std::path::{Path, PathBuf};

use super::core::ModscoreConfig;
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".modscore.toml";
const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse config from a TOML string
pub fn parse_config(contents: &str) -> Result<ModscoreConfig> {
    let config = toml::from_str::<ModscoreConfig>(contents)?;
    if config.scan.extensions.is_empty() {
        return Err(Error::Configuration(
            "scan.extensions must list at least one extension".to_string(),
        ));
    }
    Ok(config)
}

/// Try loading config from a specific path, warning on anything but a missing file
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<ModscoreConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!(
                "Failed to parse {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            Some(ModscoreConfig::default())
        }
    }
}

fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Generate directory ancestors up to a depth limit, starting with `start`
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.modscore.toml`
pub fn discover_config(start: PathBuf) -> ModscoreConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            ModscoreConfig::default()
        })
}

/// Load an explicit config file, or discover one from the working directory
pub fn load_config(explicit: Option<&Path>) -> Result<ModscoreConfig> {
    if let Some(path) = explicit {
        let contents = fs::read_to_string(path).map_err(|e| Error::io_at(e, path))?;
        return parse_config(&contents);
    }

    match std::env::current_dir() {
        Ok(dir) => Ok(discover_config(dir)),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            Ok(ModscoreConfig::default())
        }
    }
}
