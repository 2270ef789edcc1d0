pub mod graphql_error;
pub mod merge;
pub mod subschema_response;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::graphql_error::GraphQLError;

/// The response handed to the client.
///
/// `data` is absent when the request failed before execution and `null` when a non-null root
/// field could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExecutionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl ExecutionResponse {
    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        ExecutionResponse { data: None, errors }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
