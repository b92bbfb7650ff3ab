use std::env;
use std::path::PathBuf;

/// XDG Base Directory paths for ocflstore
pub struct XdgPaths;

impl XdgPaths {
    /// Get XDG_CACHE_HOME/ocflstore or fallback
    pub fn cache_dir() -> PathBuf {
        env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".cache"))
                    .unwrap_or_else(|| PathBuf::from(".cache"))
            })
            .join("ocflstore")
    }

    /// Get XDG_CONFIG_HOME/ocflstore or fallback
    pub fn config_dir() -> PathBuf {
        env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
                    .unwrap_or_else(|| PathBuf::from(".config"))
            })
            .join("ocflstore")
    }

    /// Default location of the JSON configuration file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.json")
    }
}
