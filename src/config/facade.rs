//! Config loader: assembles defaults, files, and environment into a [`StratumConfig`].

use super::merge::merge_policy::builder_with_defaults;
use super::sources::{global_file, workspace_file};
use super::StratumConfig;
use crate::error::ApiError;
use config::{Environment, File};
use std::path::{Path, PathBuf};

/// Environment prefix for overrides, e.g. `STRATUM__TRAVERSAL__DEFAULT_DEPTH=3`.
const ENV_PREFIX: &str = "STRATUM";

/// Loads [`StratumConfig`] from the standard source stack.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a project directory.
    ///
    /// Precedence (lowest to highest): defaults, global file, project
    /// `config/config.toml`, project `config/{STRATUM_ENV}.toml`, environment.
    pub fn load(project_root: &Path) -> Result<StratumConfig, ApiError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, project_root)?;
        let builder = builder.add_source(Self::environment());

        let config: StratumConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Load configuration from an explicit file, skipping the global and project files.
    pub fn load_from_file(path: &Path) -> Result<StratumConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let config: StratumConfig = builder_with_defaults()?
            .add_source(File::from(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Location of the global configuration file, if a home directory is known.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }
}
