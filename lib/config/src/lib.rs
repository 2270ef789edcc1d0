mod env_overrides;
pub mod log;
pub mod transport;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::{
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    log::LoggingConfig,
    transport::TransportConfig,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StitchingConfig {
    /// The gateway logger configuration.
    ///
    /// Defaults to `debug` in debug builds and `info` in release builds, printed as compact text.
    #[serde(default)]
    pub log: LoggingConfig,

    /// How every subschema is reached. By default all subschemas run in-process.
    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum StitchingConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "stitching.config.yaml",
    "stitching.config.yml",
    "stitching.config.json",
];

/// Loads the configuration from `override_config_path`, or from the first default file name
/// found in the working directory, then applies environment variable overrides.
pub fn load_config(
    override_config_path: Option<String>,
) -> Result<StitchingConfig, StitchingConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<std::path::PathBuf>()
            .map_err(StitchingConfigError::ConfigPathParseError)?;
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    Ok(config.build()?.try_deserialize::<StitchingConfig>()?)
}

pub fn parse_yaml_config(config_raw: String) -> Result<StitchingConfig, StitchingConfigError> {
    Config::builder()
        .add_source(File::from_str(&config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<StitchingConfig>()
        .map_err(StitchingConfigError::ConfigLoadError)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        log::{LogFormat, LogLevel},
        parse_yaml_config,
        transport::TransportKind,
    };

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_yaml_config("{}".to_string()).expect("empty config is valid");

        assert_eq!(config.log.format, LogFormat::Text);
        assert!(!config.log.log_internals);
        assert_eq!(config.transport.all.kind, TransportKind::Local);
        assert_eq!(config.transport.all.max_delay, Duration::from_secs(2));
        assert!(config.transport.all.timeout.is_none());
        assert!(config.transport.subschemas.is_empty());
    }

    #[test]
    fn parses_transports_and_durations() {
        let raw = r#"
log:
  level: warn
  format: json
transport:
  all:
    timeout: 3s
  subschemas:
    model:
      kind: simulated_remote
      max_delay: 250ms
"#;
        let config = parse_yaml_config(raw.to_string()).expect("config is valid");

        assert_eq!(config.log.level, LogLevel::Warn);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.transport.all.timeout, Some(Duration::from_secs(3)));

        let model = config.transport.for_subschema("model");
        assert_eq!(model.kind, TransportKind::SimulatedRemote);
        assert_eq!(model.max_delay, Duration::from_millis(250));
        assert_eq!(model.timeout, None);
    }

    #[test]
    fn rejects_unknown_fields() {
        let raw = r#"
transport:
  all:
    kind: local
    retries: 3
"#;
        let err = parse_yaml_config(raw.to_string()).expect_err("unknown field must fail");
        assert!(
            err.to_string().contains("unknown field `retries`"),
            "unexpected error: {err}"
        );
    }
}
