use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<GraphQLErrorLocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<GraphQLErrorPathSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl From<String> for GraphQLError {
    fn from(message: String) -> Self {
        GraphQLError {
            message,
            locations: None,
            path: None,
            extensions: None,
        }
    }
}

impl From<&str> for GraphQLError {
    fn from(message: &str) -> Self {
        message.to_string().into()
    }
}

impl GraphQLError {
    pub fn with_path(mut self, path: Vec<GraphQLErrorPathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|extensions| extensions.get("code"))
            .and_then(Value::as_str)
    }

    /// Sets `extensions.code`, keeping the other extensions.
    pub fn with_code(mut self, code: &str) -> Self {
        let mut extensions = match self.extensions.take() {
            Some(Value::Object(extensions)) => extensions,
            _ => Map::new(),
        };
        extensions.insert("code".to_string(), Value::String(code.to_string()));
        self.extensions = Some(Value::Object(extensions));
        self
    }

    /// True when the error is located at `path` or below it.
    pub fn is_under(&self, path: &[GraphQLErrorPathSegment]) -> bool {
        self.path
            .as_ref()
            .is_some_and(|error_path| error_path.starts_with(path))
    }
}

impl From<&async_graphql::ServerError> for GraphQLError {
    fn from(error: &async_graphql::ServerError) -> Self {
        GraphQLError {
            message: error.message.to_string(),
            // Locations point into the sub-query, not into the client document.
            locations: None,
            path: match error.path.is_empty() {
                true => None,
                false => Some(
                    error
                        .path
                        .iter()
                        .map(|segment| match segment {
                            async_graphql::PathSegment::Field(name) => {
                                GraphQLErrorPathSegment::String(name.to_string())
                            }
                            async_graphql::PathSegment::Index(index) => {
                                GraphQLErrorPathSegment::Index(*index)
                            }
                        })
                        .collect(),
                ),
            },
            extensions: error
                .extensions
                .as_ref()
                .and_then(|extensions| serde_json::to_value(extensions).ok()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GraphQLErrorLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GraphQLErrorPathSegment {
    String(String),
    Index(usize),
}

impl fmt::Display for GraphQLErrorPathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphQLErrorPathSegment::String(field) => write!(f, "{}", field),
            GraphQLErrorPathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for GraphQLErrorPathSegment {
    fn from(field: &str) -> Self {
        GraphQLErrorPathSegment::String(field.to_string())
    }
}

impl From<usize> for GraphQLErrorPathSegment {
    fn from(index: usize) -> Self {
        GraphQLErrorPathSegment::Index(index)
    }
}

/// `a.b.0.c`
pub fn display_path(path: &[GraphQLErrorPathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

impl<'de> Deserialize<'de> for GraphQLErrorPathSegment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PathSegmentVisitor;

        impl<'de> de::Visitor<'de> for PathSegmentVisitor {
            type Value = GraphQLErrorPathSegment;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or an integer for a GraphQL path segment")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(GraphQLErrorPathSegment::String(value.to_owned()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(GraphQLErrorPathSegment::String(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(GraphQLErrorPathSegment::Index(value as usize))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value < 0 {
                    return Err(E::custom(format!(
                        "path segment must be a non-negative integer, but got {}",
                        value
                    )));
                }
                Ok(GraphQLErrorPathSegment::Index(value as usize))
            }
        }

        deserializer.deserialize_any(PathSegmentVisitor)
    }
}
