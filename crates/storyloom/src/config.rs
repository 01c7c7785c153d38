//! Layered configuration for storyloom.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Bundled defaults (`storyloom.toml` shipped with the crate)
//! 2. `~/.config/storyloom/storyloom.toml`
//! 3. `./storyloom.toml`
//! 4. An explicit file, e.g. from `--config`
//!
//! Missing user files are skipped silently; an explicit file must exist.

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storyloom_error::{ConfigError, StoryloomError, StoryloomResult};
use storyloom_narrative::GenerationConfig;
use storyloom_rate_limit::RetryConfig;
use tracing::{debug, instrument};

#[cfg(feature = "gemini")]
use storyloom_models::ModelConfig;

const DEFAULT_CONFIG: &str = include_str!("../../../storyloom.toml");

/// Where scenelets are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory of the file repository
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./stories")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Where prompt overrides live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptsConfig {
    /// Directory searched for `{name}.md` overrides
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Complete storyloom configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryloomConfig {
    /// Model provider settings
    #[cfg(feature = "gemini")]
    #[serde(default)]
    pub model: ModelConfig,
    /// Backoff for model calls
    #[serde(default)]
    pub retry: RetryConfig,
    /// Tree expansion settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Prompt overrides
    #[serde(default)]
    pub prompts: PromptsConfig,
}

impl StoryloomConfig {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or the merged
    /// result fails validation.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use storyloom::StoryloomConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = StoryloomConfig::load()?;
    /// println!("stories live in {}", config.storage.path.display());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> StoryloomResult<Self> {
        Self::load_with(None)
    }

    /// Load configuration from the standard locations plus an explicit file
    /// with the highest precedence.
    #[instrument]
    pub fn load_with(explicit: Option<&Path>) -> StoryloomResult<Self> {
        debug!("Loading configuration: explicit > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyloom/storyloom.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyloom").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        Self::finish(builder)
    }

    /// Load configuration from a single TOML file on top of the bundled
    /// defaults, ignoring user locations.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> StoryloomResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()).required(true));
        Self::finish(builder)
    }

    /// Parse configuration from a TOML string on top of the bundled defaults.
    pub fn from_toml_str(toml: &str) -> StoryloomResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate()?;
        self.generation.validate()?;
        Ok(())
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> StoryloomResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                StoryloomError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryloomError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }
}
