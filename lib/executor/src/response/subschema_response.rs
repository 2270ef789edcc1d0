use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{executors::error::SubschemaExecutorError, response::graphql_error::GraphQLError};

/// What a subschema answered to a sub-query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SubschemaResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl SubschemaResponse {
    pub fn from_async_graphql(
        subschema_name: &str,
        response: async_graphql::Response,
    ) -> Result<Self, SubschemaExecutorError> {
        let errors = response.errors.iter().map(GraphQLError::from).collect();
        let data = match response.data {
            async_graphql::Value::Null => None,
            data => Some(data.into_json().map_err(|e| {
                SubschemaExecutorError::Serialization(subschema_name.to_string(), e.to_string())
            })?),
        };

        Ok(SubschemaResponse { data, errors })
    }
}
