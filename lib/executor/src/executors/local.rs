use std::sync::Arc;

use async_graphql::{dynamic::Schema, Variables};
use async_trait::async_trait;
use hive_stitching_composition::Subschema;
use serde_json::Value;
use tracing::debug;

use crate::{
    executors::{
        common::{SubschemaExecutionRequest, SubschemaExecutor},
        dynamic_schema::{build_schema, ResolverErrors, ResolverEvents},
        error::SubschemaExecutorError,
    },
    response::subschema_response::SubschemaResponse,
};

/// Runs sub-queries in-process against the subschema's own resolvers.
pub struct LocalSubschemaExecutor {
    subschema_name: String,
    schema: Schema,
}

impl LocalSubschemaExecutor {
    pub fn try_new(subschema: &Subschema) -> Result<Self, SubschemaExecutorError> {
        let schema = build_schema(subschema)?;
        debug!(subschema = subschema.name(), "executable subschema ready");

        Ok(Self {
            subschema_name: subschema.name().to_string(),
            schema,
        })
    }
}

#[async_trait]
impl SubschemaExecutor for LocalSubschemaExecutor {
    async fn execute(
        &self,
        execution_request: SubschemaExecutionRequest,
    ) -> Result<SubschemaResponse, SubschemaExecutorError> {
        let resolver_errors = Arc::new(ResolverErrors::default());
        let mut request = async_graphql::Request::new(execution_request.query)
            .variables(Variables::from_json(Value::Object(
                execution_request.variables,
            )))
            .data(ResolverEvents(execution_request.events))
            .data(resolver_errors.clone());
        if let Some(operation_name) = execution_request.operation_name {
            request = request.operation_name(operation_name);
        }

        let response = self.schema.execute(request).await;
        let mut response = SubschemaResponse::from_async_graphql(&self.subschema_name, response)?;

        // A failing non-null field also shows up as a missing value at the same path.
        let recorded = resolver_errors.take();
        response
            .errors
            .retain(|error| !recorded.iter().any(|failure| failure.path == error.path));
        response.errors.extend(recorded);

        Ok(response)
    }
}
