use config::{builder::BuilderState, ConfigBuilder, ConfigError};
use envconfig::Envconfig;
use tracing::debug;

use crate::{
    log::{LogFormat, LogLevel},
    transport::TransportKind,
};

#[derive(Envconfig)]
pub struct EnvVarOverrides {
    // Logger overrides
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    // Transport overrides, applied to every subschema without a dedicated entry
    #[envconfig(from = "STITCHING_TRANSPORT")]
    pub transport_kind: Option<TransportKind>,
    #[envconfig(from = "STITCHING_MAX_DELAY")]
    pub transport_max_delay: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
    #[error("Invalid duration in STITCHING_MAX_DELAY: {0}")]
    InvalidDuration(#[from] humantime::DurationError),
}

impl EnvVarOverrides {
    pub fn apply_overrides<T: BuilderState>(
        mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if let Some(log_level) = self.log_level.take() {
            debug!("[config-override] 'log.level' = {:?}", log_level);
            config = config.set_override("log.level", log_level.as_str())?;
        }
        if let Some(log_format) = self.log_format.take() {
            debug!("[config-override] 'log.format' = {:?}", log_format);
            config = config.set_override("log.format", log_format.as_str())?;
        }

        if let Some(kind) = self.transport_kind.take() {
            debug!("[config-override] 'transport.all.kind' = {:?}", kind);
            config = config.set_override("transport.all.kind", kind.as_str())?;
        }
        if let Some(max_delay) = self.transport_max_delay.take() {
            humantime::parse_duration(&max_delay)?;
            debug!("[config-override] 'transport.all.max_delay' = {}", max_delay);
            config = config.set_override("transport.all.max_delay", max_delay)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use config::{Config, File, FileFormat};

    use super::EnvVarOverrides;
    use crate::{
        log::{LogFormat, LogLevel},
        transport::TransportKind,
        StitchingConfig,
    };

    fn overrides() -> EnvVarOverrides {
        EnvVarOverrides {
            log_level: Some(LogLevel::Debug),
            log_format: None,
            transport_kind: Some(TransportKind::SimulatedRemote),
            transport_max_delay: Some("15ms".to_string()),
        }
    }

    #[test]
    fn overrides_win_over_file_values() {
        let raw = "log:\n  level: error\n  format: json\ntransport:\n  all:\n    kind: local\n    max_delay: 1s\n";
        let builder = Config::builder().add_source(File::from_str(raw, FileFormat::Yaml));

        let config = overrides()
            .apply_overrides(builder)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<StitchingConfig>()
            .unwrap();

        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.transport.all.kind, TransportKind::SimulatedRemote);
        assert_eq!(config.transport.all.max_delay, Duration::from_millis(15));
    }

    #[test]
    fn invalid_max_delay_is_rejected() {
        let mut overrides = overrides();
        overrides.transport_max_delay = Some("soon".to_string());

        assert!(overrides.apply_overrides(Config::builder()).is_err());
    }
}
