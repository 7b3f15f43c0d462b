use crate::config::SurvivorConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the default path, with `SURVIVOR_`-prefixed
    /// environment variables taking precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value fails
    /// validation.
    pub fn load() -> Result<SurvivorConfig> {
        Self::load_from("config/survivor.toml")
    }

    /// Loads configuration from an explicit TOML path.
    ///
    /// A missing file is not an error; defaults plus environment overrides
    /// apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value fails
    /// validation.
    pub fn load_from(path: &str) -> Result<SurvivorConfig> {
        let config: SurvivorConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("SURVIVOR_"))
            .extract()?;

        config.validate()?;
        tracing::debug!(path, index = %config.index_symbol, "Configuration loaded");
        Ok(config)
    }
}
