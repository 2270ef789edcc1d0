use std::time::Duration;

use async_trait::async_trait;
use hive_stitching_composition::Subschema;
use rand::Rng;
use tracing::trace;

use crate::{
    executors::{
        common::{SubschemaExecutionRequest, SubschemaExecutor},
        error::SubschemaExecutorError,
        local::LocalSubschemaExecutor,
    },
    response::subschema_response::SubschemaResponse,
};

/// Serves a subschema as if it lived behind the network: the executable schema is built from the
/// printed SDL, every exchange is encoded to JSON bytes and each call waits for a random delay.
pub struct SimulatedRemoteExecutor {
    subschema_name: String,
    max_delay: Duration,
    remote: LocalSubschemaExecutor,
}

impl SimulatedRemoteExecutor {
    pub fn try_new(subschema: &Subschema, max_delay: Duration) -> Result<Self, SubschemaExecutorError> {
        let printed = subschema.sdl();
        let remote_view = Subschema::new(subschema.name(), &printed, subschema.resolvers().clone())
            .map_err(|e| {
                SubschemaExecutorError::SchemaBuildFailure(subschema.name().to_string(), e.to_string())
            })?;

        Ok(Self {
            subschema_name: subschema.name().to_string(),
            max_delay,
            remote: LocalSubschemaExecutor::try_new(&remote_view)?,
        })
    }

    fn random_delay(&self) -> Duration {
        let max_millis = self.max_delay.as_millis() as u64;
        if max_millis == 0 {
            return Duration::ZERO;
        }

        Duration::from_millis(rand::rng().random_range(0..=max_millis))
    }

    fn serialization_error(&self, error: serde_json::Error) -> SubschemaExecutorError {
        SubschemaExecutorError::Serialization(self.subschema_name.clone(), error.to_string())
    }
}

#[async_trait]
impl SubschemaExecutor for SimulatedRemoteExecutor {
    async fn execute(
        &self,
        execution_request: SubschemaExecutionRequest,
    ) -> Result<SubschemaResponse, SubschemaExecutorError> {
        let delay = self.random_delay();
        trace!(subschema = %self.subschema_name, delay = ?delay, "simulating latency");
        tokio::time::sleep(delay).await;

        let events = execution_request.events.clone();
        let request_bytes =
            serde_json::to_vec(&execution_request).map_err(|e| self.serialization_error(e))?;
        let received: SubschemaExecutionRequest =
            serde_json::from_slice(&request_bytes).map_err(|e| self.serialization_error(e))?;

        let response = self.remote.execute(received.with_events(events)).await?;

        let response_bytes =
            serde_json::to_vec(&response).map_err(|e| self.serialization_error(e))?;
        serde_json::from_slice(&response_bytes).map_err(|e| self.serialization_error(e))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hive_stitching_composition::{EntityAnnotation, Subschema};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn answers_like_the_local_executor() {
        let subschema = Subschema::builder(
            "model",
            "type Query { getClient(id: ID!): Client } type Client { _id: ID! name: String }",
        )
        .entity(
            EntityAnnotation::new("Client")
                .key(["_id"])
                .entry_field("getClient")
                .key_argument("_id", "id"),
        )
        .sync_resolver("Query", "getClient", |params| {
            Ok(json!({ "_id": params.args["id"], "name": "A NAME" }))
        })
        .build()
        .unwrap();

        let query = r#"{ getClient(id: "c1") { _id name } }"#;
        let remote = SimulatedRemoteExecutor::try_new(&subschema, Duration::from_millis(5)).unwrap();
        let local = LocalSubschemaExecutor::try_new(&subschema).unwrap();

        let remote_response = remote
            .execute(SubschemaExecutionRequest::new(query))
            .await
            .unwrap();
        let local_response = local
            .execute(SubschemaExecutionRequest::new(query))
            .await
            .unwrap();

        assert_eq!(remote_response, local_response);
        assert_eq!(
            remote_response.data,
            Some(json!({ "getClient": { "_id": "c1", "name": "A NAME" } }))
        );
    }

    #[test]
    fn zero_max_delay_never_waits() {
        let subschema = Subschema::new(
            "feeds",
            "type Query { a: String }",
            Default::default(),
        )
        .unwrap();
        let executor = SimulatedRemoteExecutor::try_new(&subschema, Duration::ZERO).unwrap();

        assert_eq!(executor.random_delay(), Duration::ZERO);
    }
}
