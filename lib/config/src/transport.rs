use std::{collections::HashMap, str::FromStr, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a subschema is reached by the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Resolvers run in-process, on the caller's task.
    #[default]
    Local,
    /// The subschema is served from its printed SDL, every call goes through a JSON round trip
    /// and waits for a random delay in `[0, max_delay]`.
    SimulatedRemote,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Local => "local",
            TransportKind::SimulatedRemote => "simulated_remote",
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "local" => Ok(TransportKind::Local),
            "simulated_remote" | "remote" => Ok(TransportKind::SimulatedRemote),
            _ => Err(format!("Invalid transport kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SubschemaTransportConfig {
    /// The transport used to execute sub-queries.
    #[serde(default)]
    pub kind: TransportKind,

    /// Upper bound of the artificial latency added by the `simulated_remote` transport.
    #[serde(
        default = "default_max_delay",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub max_delay: Duration,

    /// Optional deadline for a single sub-query. An expired call is reported as a transport error
    /// on the fields it was meant to resolve.
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,
}

impl Default for SubschemaTransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            max_delay: default_max_delay(),
            timeout: None,
        }
    }
}

fn default_max_delay() -> Duration {
    Duration::from_secs(2)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Settings applied to every subschema without a dedicated entry.
    #[serde(default)]
    pub all: SubschemaTransportConfig,

    /// Per-subschema settings, keyed by subschema name.
    #[serde(default)]
    pub subschemas: HashMap<String, SubschemaTransportConfig>,
}

impl TransportConfig {
    pub fn for_subschema(&self, name: &str) -> &SubschemaTransportConfig {
        self.subschemas.get(name).unwrap_or(&self.all)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn subschema_entry_overrides_defaults() {
        let config = TransportConfig {
            all: SubschemaTransportConfig::default(),
            subschemas: HashMap::from([(
                "model".to_string(),
                SubschemaTransportConfig {
                    kind: TransportKind::SimulatedRemote,
                    max_delay: Duration::from_millis(50),
                    timeout: Some(Duration::from_secs(1)),
                },
            )]),
        };

        assert_eq!(config.for_subschema("feeds").kind, TransportKind::Local);
        assert_eq!(
            config.for_subschema("model").kind,
            TransportKind::SimulatedRemote
        );
        assert_eq!(
            config.for_subschema("model").max_delay,
            Duration::from_millis(50)
        );
    }

    #[test]
    fn transport_kind_from_str() {
        assert_eq!(
            "simulated-remote".parse::<TransportKind>(),
            Ok(TransportKind::SimulatedRemote)
        );
        assert_eq!("LOCAL".parse::<TransportKind>(), Ok(TransportKind::Local));
        assert!("http".parse::<TransportKind>().is_err());
    }
}
