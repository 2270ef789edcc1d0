/// Errors raised while annotating or composing subschemas.
///
/// All of them are fatal: composition never hands out a partial supergraph.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("Malformed schema in subschema \"{subschema}\": {reason}")]
    MalformedSchema { subschema: String, reason: String },
    #[error(
        "Conflicting definitions of \"{coordinate}\" in subschemas \"{first}\" and \"{second}\": {reason}"
    )]
    CompositionConflict {
        coordinate: String,
        first: String,
        second: String,
        reason: String,
    },
    #[error("Type \"{type_name}\" is mergeable but has no declared key: {reason}")]
    MissingKeyDirective { type_name: String, reason: String },
    #[error("Subschema \"{0}\" is registered more than once")]
    DuplicateSubschema(String),
}

impl CompositionError {
    pub(crate) fn malformed(subschema: &str, reason: impl Into<String>) -> Self {
        CompositionError::MalformedSchema {
            subschema: subschema.to_string(),
            reason: reason.into(),
        }
    }
}
