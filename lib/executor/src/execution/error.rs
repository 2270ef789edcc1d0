use crate::{
    executors::error::SubschemaExecutorError,
    response::graphql_error::{GraphQLError, GraphQLErrorPathSegment},
};

/// Code given to subschema errors that carry none.
pub const RESOLVER_ERROR_CODE: &str = "RESOLVER_ERROR";

/// Failure to resolve a single field. Recovered at the nearest nullable ancestor.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("Cannot merge \"{type_name}\": key field \"{key_field}\" is missing or null")]
    MergeKeyMissing {
        type_name: String,
        key_field: String,
    },
    #[error("{0}")]
    Resolver(String),
    #[error("Failed to execute request to subschema \"{subschema}\": {reason}")]
    Transport { subschema: String, reason: String },
    #[error("Cannot resolve field \"{coordinate}\": {reason}")]
    UnresolvableField { coordinate: String, reason: String },
    #[error("Cannot return null for non-nullable field {coordinate}.")]
    NonNullViolation { coordinate: String },
}

impl FieldError {
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::MergeKeyMissing { .. } => "MERGE_KEY_MISSING",
            FieldError::Resolver(_) => RESOLVER_ERROR_CODE,
            FieldError::Transport { .. } => "TRANSPORT_ERROR",
            FieldError::UnresolvableField { .. } => "UNRESOLVABLE_FIELD",
            FieldError::NonNullViolation { .. } => "NON_NULL_VIOLATION",
        }
    }

    pub fn transport(subschema: &str, error: &SubschemaExecutorError) -> Self {
        FieldError::Transport {
            subschema: subschema.to_string(),
            reason: error.to_string(),
        }
    }

    pub fn into_graphql_error(self, path: Vec<GraphQLErrorPathSegment>) -> GraphQLError {
        let code = self.code();
        GraphQLError::from(self.to_string())
            .with_path(path)
            .with_code(code)
    }
}

/// Failure that prevents execution altogether. The response carries no `data`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Failed to parse the query: {0}")]
    Parse(String),
    #[error("The document does not contain any operation")]
    NoOperation,
    #[error("Unknown operation named \"{0}\"")]
    UnknownOperation(String),
    #[error("The document contains several operations, an operation name is required")]
    AmbiguousOperation,
    #[error("{0} operations are not supported, only queries can be stitched")]
    UnsupportedOperation(&'static str),
    #[error("Variable \"${name}\" of required type \"{variable_type}\" was not provided")]
    MissingVariable { name: String, variable_type: String },
    #[error("Unknown fragment \"{0}\"")]
    UnknownFragment(String),
    #[error("Cannot query field \"{field_name}\" on type \"{type_name}\"")]
    UnknownField {
        type_name: String,
        field_name: String,
    },
    #[error("Unknown argument \"{argument}\" on field \"{coordinate}\"")]
    UnknownArgument { coordinate: String, argument: String },
    #[error("Field \"{coordinate}\" argument \"{argument}\" of type \"{argument_type}\" is required but not provided")]
    MissingArgument {
        coordinate: String,
        argument: String,
        argument_type: String,
    },
    #[error("Field \"{coordinate}\" {reason}")]
    SelectionMismatch { coordinate: String, reason: String },
}

impl RequestError {
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::Parse(_) => "GRAPHQL_PARSE_FAILED",
            RequestError::MissingVariable { .. } => "BAD_USER_INPUT",
            RequestError::NoOperation
            | RequestError::UnknownOperation(_)
            | RequestError::AmbiguousOperation
            | RequestError::UnsupportedOperation(_) => "OPERATION_RESOLUTION_FAILURE",
            RequestError::UnknownFragment(_)
            | RequestError::UnknownField { .. }
            | RequestError::UnknownArgument { .. }
            | RequestError::MissingArgument { .. }
            | RequestError::SelectionMismatch { .. } => "GRAPHQL_VALIDATION_FAILED",
        }
    }
}

impl From<RequestError> for GraphQLError {
    fn from(error: RequestError) -> Self {
        let code = error.code();
        GraphQLError::from(error.to_string()).with_code(code)
    }
}
