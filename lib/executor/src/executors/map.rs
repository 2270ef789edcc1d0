use std::collections::HashMap;

use hive_stitching_composition::Subschema;
use hive_stitching_config::transport::{TransportConfig, TransportKind};
use tracing::debug;

use crate::{
    executors::{
        common::{SubschemaExecutionRequest, SubschemaExecutor, SubschemaExecutorBoxedArc},
        error::SubschemaExecutorError,
        local::LocalSubschemaExecutor,
        simulated::SimulatedRemoteExecutor,
        timeout::TimeoutExecutor,
    },
    response::subschema_response::SubschemaResponse,
};

pub struct SubschemaExecutorMap {
    inner: HashMap<String, SubschemaExecutorBoxedArc>,
}

impl Default for SubschemaExecutorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SubschemaExecutorMap {
    pub fn new() -> Self {
        SubschemaExecutorMap {
            inner: HashMap::new(),
        }
    }

    pub async fn execute(
        &self,
        subschema_name: &str,
        execution_request: SubschemaExecutionRequest,
    ) -> Result<SubschemaResponse, SubschemaExecutorError> {
        match self.inner.get(subschema_name) {
            Some(executor) => executor.execute(execution_request).await,
            None => Err(SubschemaExecutorError::ExecutorNotFound(
                subschema_name.to_string(),
            )),
        }
    }

    pub fn insert_boxed_arc(&mut self, subschema_name: String, boxed_arc: SubschemaExecutorBoxedArc) {
        self.inner.insert(subschema_name, boxed_arc);
    }

    pub fn contains(&self, subschema_name: &str) -> bool {
        self.inner.contains_key(subschema_name)
    }

    /// One executor per subschema, picked from the transport configuration and wrapped in a
    /// [`TimeoutExecutor`] when a timeout is set.
    pub fn from_subschemas(
        subschemas: &[Subschema],
        transport_config: &TransportConfig,
    ) -> Result<Self, SubschemaExecutorError> {
        let mut map = Self::new();

        for subschema in subschemas {
            let config = transport_config.for_subschema(subschema.name());
            let executor = match config.kind {
                TransportKind::Local => LocalSubschemaExecutor::try_new(subschema)?.to_boxed_arc(),
                TransportKind::SimulatedRemote => {
                    SimulatedRemoteExecutor::try_new(subschema, config.max_delay)?.to_boxed_arc()
                }
            };
            let executor = match config.timeout {
                Some(timeout) => {
                    TimeoutExecutor::new(subschema.name(), timeout, executor).to_boxed_arc()
                }
                None => executor,
            };

            debug!(
                subschema = subschema.name(),
                transport = config.kind.as_str(),
                timeout = ?config.timeout,
                "subschema executor registered"
            );
            map.insert_boxed_arc(subschema.name().to_string(), executor);
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use hive_stitching_composition::Subschema;
    use hive_stitching_config::parse_yaml_config;

    use super::*;

    #[tokio::test]
    async fn unknown_subschema_is_an_error() {
        let map = SubschemaExecutorMap::new();

        let result = map
            .execute("nowhere", SubschemaExecutionRequest::new("{ __typename }"))
            .await;

        assert_eq!(
            result,
            Err(SubschemaExecutorError::ExecutorNotFound("nowhere".to_string()))
        );
    }

    #[tokio::test]
    async fn executors_follow_the_transport_config() {
        let config = parse_yaml_config(
            r#"
transport:
  subschemas:
    remote:
      kind: simulated_remote
      max_delay: 1ms
      timeout: 1s
"#
            .to_string(),
        )
        .unwrap();
        let subschemas = [
            Subschema::new("local", "type Query { a: String }", Default::default()).unwrap(),
            Subschema::new("remote", "type Query { b: String }", Default::default()).unwrap(),
        ];

        let map = SubschemaExecutorMap::from_subschemas(&subschemas, &config.transport).unwrap();

        assert!(map.contains("local"));
        assert!(map.contains("remote"));
        let response = map
            .execute("remote", SubschemaExecutionRequest::new("{ b }"))
            .await
            .unwrap();
        assert_eq!(response.data, Some(serde_json::json!({ "b": null })));
    }
}
