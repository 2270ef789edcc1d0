use std::sync::Arc;

use async_trait::async_trait;
use hive_stitching_internal::events::{SharedEventSink, TracingEventSink};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    executors::error::SubschemaExecutorError, response::subschema_response::SubschemaResponse,
};

#[async_trait]
pub trait SubschemaExecutor {
    async fn execute(
        &self,
        execution_request: SubschemaExecutionRequest,
    ) -> Result<SubschemaResponse, SubschemaExecutorError>;

    fn to_boxed_arc<'a>(self) -> Arc<Box<dyn SubschemaExecutor + Send + Sync + 'a>>
    where
        Self: Sized + Send + Sync + 'a,
    {
        Arc::new(Box::new(self))
    }
}

pub type SubschemaExecutorType = dyn crate::executors::common::SubschemaExecutor + Send + Sync;

pub type SubschemaExecutorBoxedArc = Arc<Box<SubschemaExecutorType>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubschemaExecutionRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    /// Receives the events emitted by resolvers while the request runs. Never leaves the process.
    #[serde(skip, default = "tracing_sink")]
    pub events: SharedEventSink,
}

fn tracing_sink() -> SharedEventSink {
    Arc::new(TracingEventSink)
}

impl SubschemaExecutionRequest {
    pub fn new(query: impl Into<String>) -> Self {
        SubschemaExecutionRequest {
            query: query.into(),
            operation_name: None,
            variables: Map::new(),
            events: tracing_sink(),
        }
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_events(mut self, events: SharedEventSink) -> Self {
        self.events = events;
        self
    }
}
