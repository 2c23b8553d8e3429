//! Layered configuration: defaults, then `fixmem.toml`, then `FIXMEM_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use fixmem_memory::ArenaConfig;
use serde::{Deserialize, Serialize};

/// Config file read from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "fixmem.toml";

/// Prefix for environment overrides; `__` separates nested keys
/// (`FIXMEM_ARENA__CAPACITY=4096`)
pub const ENV_PREFIX: &str = "FIXMEM_";

/// Arena capacity the demo was written around
pub const DEMO_CAPACITY: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub arena: ArenaConfig,
    pub log: LogConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::new(DEMO_CAPACITY),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `warn` or `fixmem_memory=trace`
    pub level: String,
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            ansi: true,
        }
    }
}

/// Values given on the command line, applied last
#[derive(Debug, Default)]
pub struct Overrides {
    pub capacity: Option<usize>,
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Merges every layer
    ///
    /// An explicit `config_path` must exist; the default file is optional.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file: PathBuf = match config_path {
            Some(path) if !path.exists() => {
                bail!("config file {} does not exist", path.display())
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(capacity) = overrides.capacity {
            figment = figment.merge(Serialized::default("arena.capacity", capacity));
        }
        if let Some(level) = &overrides.log_level {
            figment = figment.merge(Serialized::default("log.level", level));
        }

        figment
            .extract()
            .with_context(|| format!("invalid configuration (file: {})", file.display()))
    }
}
