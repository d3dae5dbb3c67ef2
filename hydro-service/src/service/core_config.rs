use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};

pub const ENV_PREFIX: &str = "HYDRO";
pub const ENV_SEPARATOR: &str = "__";

pub fn stage_config_file(stage: &str) -> String {
    format!("server_config.{}.json", stage)
}

/// Variables like `HYDRO__ID_ENCODER__SECRET_KEY` map to `id_encoder.secret_key`.
pub fn environment_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
}

/// A source of the layered configuration given as `schema://path`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigLayer {
    /// `file://path`, a mandatory json file
    File(String),
    /// `file?://path`, a json file that is used only if it exists
    OptionalFile(String),
    /// `self`, the configuration file of the stage
    Stage,
    /// `environment`, variables with the `HYDRO__` prefix, `__` separating the nested keys
    Environment,
}

impl FromStr for ConfigLayer {
    type Err = ConfigError;

    fn from_str(layer: &str) -> Result<Self, Self::Err> {
        let invalid = |cause: &str| ConfigError::FileParse {
            uri: Some(layer.to_owned()),
            cause: cause.into(),
        };

        let mut tokens = layer.splitn(2, "://");
        let schema = tokens.next().ok_or_else(|| invalid("Invalid config layer url"))?;
        let path = tokens.next();

        match (schema, path) {
            ("file", Some(path)) if !path.is_empty() => Ok(ConfigLayer::File(path.to_owned())),
            ("file?", Some(path)) if !path.is_empty() => Ok(ConfigLayer::OptionalFile(path.to_owned())),
            ("file" | "file?", _) => Err(invalid("Missing file path")),
            ("self", None) => Ok(ConfigLayer::Stage),
            ("environment", None) => Ok(ConfigLayer::Environment),
            ("self" | "environment", Some(_)) => Err(invalid("Unexpected path")),
            (schema, _) => Err(invalid(&format!("Unsupported schema, {schema}"))),
        }
    }
}

/// Partial configuration required for early setup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreConfig {
    pub stage: String,
    #[serde(default)]
    pub layers: Vec<String>,
}

impl CoreConfig {
    pub fn new(stage: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(Path::new(&stage_config_file(stage))))
            .set_override("stage", stage)?;

        let s = builder.build()?;
        s.try_deserialize()
    }

    pub fn config_layers(&self) -> Result<Vec<ConfigLayer>, ConfigError> {
        let mut layers = self
            .layers
            .iter()
            .map(|layer| layer.parse::<ConfigLayer>())
            .collect::<Result<Vec<_>, _>>()?;

        // make sure self is added
        if !layers.contains(&ConfigLayer::Stage) {
            layers.push(ConfigLayer::Stage);
        }

        Ok(layers)
    }

    pub fn create_config_builder(&self) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder = Config::builder();

        for layer in self.config_layers()? {
            builder = match layer {
                ConfigLayer::File(path) => builder.add_source(File::from(Path::new(&path))),
                ConfigLayer::OptionalFile(path) => builder.add_source(File::from(Path::new(&path)).required(false)),
                ConfigLayer::Stage => builder.add_source(File::from(Path::new(&stage_config_file(&self.stage)))),
                ConfigLayer::Environment => builder.add_source(environment_source()),
            };
        }

        builder = builder.set_override("stage", self.stage.clone())?;

        Ok(builder)
    }
}
