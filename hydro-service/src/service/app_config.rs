use crate::{
    axum::{telemetry::TracingConfig, ProblemConfig},
    service::CoreConfig,
    utils::id_encoders::{IdEncoderError, SealedIdEncoder, SharedIdEncoder},
};
use config::{Config, ConfigError};
use serde::Deserialize;
use std::{fmt, sync::Arc};
use url::Url;

/// The process-wide secret of the id tokens.
#[derive(Clone, Deserialize)]
pub struct IdEncoderConfig {
    pub secret_key: String,
}

impl IdEncoderConfig {
    pub fn create_encoder(&self) -> Result<SharedIdEncoder, IdEncoderError> {
        Ok(Arc::new(SealedIdEncoder::new(&self.secret_key)?))
    }
}

impl fmt::Debug for IdEncoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdEncoderConfig").field("secret_key", &"***").finish()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServiceConfig {
    pub port: u16,
    /// Base of the generated links, the path of the declaration pages are appended to it
    pub public_url: Url,
    #[serde(default)]
    pub include_internal_problems: bool,
    /// Json file with the initial content of the in-memory declaration store
    pub seed_file: Option<String>,
}

impl ServiceConfig {
    pub fn problem_config(&self) -> ProblemConfig {
        ProblemConfig {
            include_internal: self.include_internal_problems,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub stage: String,
    pub service: ServiceConfig,
    pub id_encoder: IdEncoderConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

impl AppConfig {
    /// Load the full configuration from the layers of the core config.
    /// A missing secret key fails the whole load.
    pub fn new(core: &CoreConfig) -> Result<Self, ConfigError> {
        let config = core.create_config_builder()?.build()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }
}
