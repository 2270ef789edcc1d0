use hive_stitching_composition::Supergraph;
use hive_stitching_internal::events::{SharedEventSink, StitchingEvent};
use tracing::{info_span, Instrument};

use crate::{
    execution::query_builder::SubQuery,
    executors::{
        common::SubschemaExecutionRequest, error::SubschemaExecutorError,
        map::SubschemaExecutorMap,
    },
    response::subschema_response::SubschemaResponse,
};

pub struct ExecutionContext<'a> {
    pub supergraph: &'a Supergraph,
    pub executors: &'a SubschemaExecutorMap,
    pub events: SharedEventSink,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        supergraph: &'a Supergraph,
        executors: &'a SubschemaExecutorMap,
        events: SharedEventSink,
    ) -> Self {
        ExecutionContext {
            supergraph,
            executors,
            events,
        }
    }

    /// Sends one sub-query through the transport of `subschema`.
    pub async fn call_subschema(
        &self,
        subschema: &str,
        sub_query: SubQuery,
    ) -> Result<SubschemaResponse, SubschemaExecutorError> {
        self.events.emit(StitchingEvent::SubschemaRequest {
            subschema: subschema.to_string(),
            query: sub_query.query.clone(),
        });

        let request = SubschemaExecutionRequest::new(sub_query.query)
            .with_variables(sub_query.variables)
            .with_events(self.events.clone());

        self.executors
            .execute(subschema, request)
            .instrument(info_span!("subschema_request", subschema = %subschema))
            .await
    }
}
