use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SubschemaExecutorError {
    #[error("Subschema executor not found for subschema \"{0}\"")]
    ExecutorNotFound(String),
    #[error("Failed to build the executable schema of subschema \"{0}\": {1}")]
    SchemaBuildFailure(String, String),
    #[error("Request to subschema \"{0}\" timed out after {1:?}")]
    RequestTimeout(String, Duration),
    #[error("Failed to serialize the exchange with subschema \"{0}\": {1}")]
    Serialization(String, String),
}
