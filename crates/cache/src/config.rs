//! Storage configuration with precedence and validation
//!
//! Values are resolved from defaults, then an optional JSON file, then
//! `OCFLSTORE_*` environment variables. The result is plain data: building
//! storage instances from it is left to [`StorageStack`](crate::StorageStack).

use crate::errors::{CacheError, RecoveryHint, Result, SerializationOp};
use ocflstore_core::{DigestAlgorithm, ENV_PREFIX};
use ocflstore_utils::XdgPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Eviction policy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvictionConfig {
    /// Keep everything
    Never,
    /// Evict least recently used files above a byte limit
    MaxSize { max_bytes: u64 },
}

impl EvictionConfig {
    pub fn max_bytes(max_bytes: u64) -> Self {
        Self::MaxSize { max_bytes }
    }

    pub fn max_megabytes(megabytes: u64) -> Self {
        Self::MaxSize {
            max_bytes: megabytes.saturating_mul(BYTES_PER_MEGABYTE),
        }
    }

    /// Parse a policy name such as `never` or `max_size`
    pub fn from_name(name: &str, max_bytes: Option<u64>) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "never" | "none" => Ok(Self::Never),
            "max_size" | "max-size" | "maxsize" => match max_bytes {
                Some(max_bytes) => Ok(Self::MaxSize { max_bytes }),
                None => Err(CacheError::Configuration {
                    message: "max_size eviction requires a byte limit".to_string(),
                    recovery_hint: RecoveryHint::Manual {
                        instructions: format!(
                            "Set {ENV_PREFIX}_MAX_SIZE_MB or {ENV_PREFIX}_MAX_SIZE_BYTES"
                        ),
                    },
                }),
            },
            _ => Err(CacheError::Configuration {
                message: format!("Unknown eviction strategy: {name}"),
                recovery_hint: RecoveryHint::UseDefault {
                    value: "never".to_string(),
                },
            }),
        }
    }
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self::Never
    }
}

/// Configuration of the whole storage stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding every storage tier
    pub root: PathBuf,
    /// Size bound applied to the rolling cache and the content cache
    pub eviction: EvictionConfig,
    /// Algorithm used to address cached content
    pub digest_algorithm: DigestAlgorithm,
    /// Compact the content cache journal after this many events
    pub journal_compaction_threshold: Option<u64>,
    /// Adopt files left in the rolling cache by a previous process
    pub index_existing_on_start: bool,
    /// Where the configuration came from
    #[serde(skip)]
    pub source: ConfigSource,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG cache directory which respects XDG_CACHE_HOME
        Self {
            root: XdgPaths::cache_dir(),
            eviction: EvictionConfig::Never,
            digest_algorithm: DigestAlgorithm::default(),
            journal_compaction_threshold: None,
            index_existing_on_start: false,
            source: ConfigSource::Default,
        }
    }
}

impl StorageConfig {
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::new()
    }

    /// Root of the content-addressable cache
    pub fn cas_dir(&self) -> PathBuf {
        self.root.join("cas")
    }

    /// Root of the rolling cache
    pub fn rolling_dir(&self) -> PathBuf {
        self.root.join("rolling")
    }

    /// Root of the per-transaction overlays
    pub fn transactions_dir(&self) -> PathBuf {
        self.root.join("transactions")
    }

    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(CacheError::configuration("storage root must not be empty"));
        }
        if self.journal_compaction_threshold == Some(0) {
            return Err(CacheError::Configuration {
                message: "journal compaction threshold must be positive".to_string(),
                recovery_hint: RecoveryHint::UseDefault {
                    value: "unset".to_string(),
                },
            });
        }
        Ok(())
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default configuration
    #[default]
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variables with the given prefix
    EnvironmentVariable(String),
    /// Set programmatically through the builder
    Programmatic,
}

/// Builder for creating storage configurations
pub struct StorageConfigBuilder {
    config: StorageConfig,
}

impl StorageConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: StorageConfig {
                source: ConfigSource::Programmatic,
                ..StorageConfig::default()
            },
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    pub fn with_eviction(mut self, eviction: EvictionConfig) -> Self {
        self.config.eviction = eviction;
        self
    }

    /// Shorthand for a `max_size` eviction limit in bytes
    pub fn with_max_size_bytes(self, max_bytes: u64) -> Self {
        self.with_eviction(EvictionConfig::max_bytes(max_bytes))
    }

    /// Shorthand for a `max_size` eviction limit in mebibytes
    pub fn with_max_size_megabytes(self, megabytes: u64) -> Self {
        self.with_eviction(EvictionConfig::max_megabytes(megabytes))
    }

    pub fn with_digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.config.digest_algorithm = algorithm;
        self
    }

    pub fn with_journal_compaction_threshold(mut self, threshold: u64) -> Self {
        self.config.journal_compaction_threshold = Some(threshold);
        self
    }

    pub fn with_index_existing_on_start(mut self, enabled: bool) -> Self {
        self.config.index_existing_on_start = enabled;
        self
    }

    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.config.source = source;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<StorageConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for StorageConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Partially specified configuration, as read from one source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PartialStorageConfig {
    root: Option<PathBuf>,
    eviction: Option<EvictionConfig>,
    digest_algorithm: Option<DigestAlgorithm>,
    journal_compaction_threshold: Option<u64>,
    index_existing_on_start: Option<bool>,
}

impl PartialStorageConfig {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(self, config: &mut StorageConfig) {
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(eviction) = self.eviction {
            config.eviction = eviction;
        }
        if let Some(algorithm) = self.digest_algorithm {
            config.digest_algorithm = algorithm;
        }
        if let Some(threshold) = self.journal_compaction_threshold {
            config.journal_compaction_threshold = Some(threshold);
        }
        if let Some(enabled) = self.index_existing_on_start {
            config.index_existing_on_start = enabled;
        }
    }
}

/// Configuration loader that handles precedence
pub struct StorageConfigLoader;

impl StorageConfigLoader {
    /// Load from the default file location and the process environment
    pub fn load() -> Result<StorageConfig> {
        Self::load_from(Some(&XdgPaths::config_file()), |key| std::env::var(key).ok())
    }

    /// Load with an explicit config file and environment lookup
    ///
    /// A missing file is skipped; a file that does not parse is an error.
    pub fn load_from<F>(config_file: Option<&Path>, env: F) -> Result<StorageConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StorageConfig::default();

        if let Some(path) = config_file {
            if let Some(file_config) = Self::load_from_config_file(path)? {
                file_config.apply_to(&mut config);
                config.source = ConfigSource::ConfigFile(path.to_path_buf());
            }
        }

        let env_config = Self::load_from_env(&env)?;
        if !env_config.is_empty() {
            env_config.apply_to(&mut config);
            config.source = ConfigSource::EnvironmentVariable(format!("{ENV_PREFIX}_*"));
        }

        config.validate()?;
        tracing::debug!(source = ?config.source, root = %config.root.display(), "storage configuration loaded");
        Ok(config)
    }

    /// Load configuration from config file
    fn load_from_config_file(path: &Path) -> Result<Option<PartialStorageConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            operation: "read config file",
            source: e,
            recovery_hint: RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
        })?;

        let parsed = serde_json::from_str(&content).map_err(|e| CacheError::Serialization {
            key: path.display().to_string(),
            operation: SerializationOp::Decode,
            source: Box::new(e),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check config file syntax".to_string(),
            },
        })?;
        Ok(Some(parsed))
    }

    /// Load configuration from environment variables
    fn load_from_env<F>(env: &F) -> Result<PartialStorageConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| env(&format!("{ENV_PREFIX}_{name}")).filter(|v| !v.is_empty());
        let mut partial = PartialStorageConfig::default();

        if let Some(root) = var("ROOT") {
            partial.root = Some(PathBuf::from(root));
        }

        let max_bytes = match (var("MAX_SIZE_BYTES"), var("MAX_SIZE_MB")) {
            (Some(bytes), _) => Some(parse_number("MAX_SIZE_BYTES", &bytes)?),
            (None, Some(mb)) => {
                Some(parse_number("MAX_SIZE_MB", &mb)?.saturating_mul(BYTES_PER_MEGABYTE))
            }
            (None, None) => None,
        };
        partial.eviction = match var("EVICTION") {
            Some(name) => Some(EvictionConfig::from_name(&name, max_bytes)?),
            None => max_bytes.map(|max_bytes| EvictionConfig::MaxSize { max_bytes }),
        };

        if let Some(algorithm) = var("DIGEST_ALGORITHM") {
            partial.digest_algorithm = Some(algorithm.parse()?);
        }
        if let Some(threshold) = var("JOURNAL_COMPACTION_THRESHOLD") {
            partial.journal_compaction_threshold =
                Some(parse_number("JOURNAL_COMPACTION_THRESHOLD", &threshold)?);
        }
        if let Some(enabled) = var("INDEX_EXISTING") {
            partial.index_existing_on_start = Some(matches!(
                enabled.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ));
        }

        Ok(partial)
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        CacheError::configuration(format!(
            "{ENV_PREFIX}_{name} must be a non-negative integer, got '{value}'"
        ))
    })
}
