use std::{collections::HashMap, fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};
use hive_stitching_internal::events::{SharedEventSink, StitchingEvent, TracingEventSink};
use serde_json::{Map, Value};

/// `Type.field`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldCoordinate {
    pub type_name: String,
    pub field_name: String,
}

impl FieldCoordinate {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl fmt::Display for FieldCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResolverError {
    pub message: String,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What a resolver knows about the call it serves.
#[derive(Debug, Clone)]
pub struct ResolverContext {
    pub subschema: Arc<str>,
    pub coordinate: FieldCoordinate,
    pub events: SharedEventSink,
}

impl ResolverContext {
    pub fn new(subschema: Arc<str>, coordinate: FieldCoordinate, events: SharedEventSink) -> Self {
        Self {
            subschema,
            coordinate,
            events,
        }
    }

    /// Context for calling a resolver outside of a query, events go to `tracing`.
    pub fn detached(subschema: &str, coordinate: FieldCoordinate) -> Self {
        Self::new(subschema.into(), coordinate, Arc::new(TracingEventSink))
    }

    pub fn log(&self, message: impl Into<String>, payload: Value) {
        self.events.emit(StitchingEvent::Message {
            subschema: self.subschema.to_string(),
            message: message.into(),
            payload,
        });
    }
}

#[derive(Debug, Clone)]
pub struct ResolverParams {
    /// The object the field is resolved on, `null` on the query root.
    pub parent: Value,
    pub args: Map<String, Value>,
    pub context: ResolverContext,
}

pub type ResolverFuture = BoxFuture<'static, Result<Value, ResolverError>>;
pub type ResolverFn = Arc<dyn Fn(ResolverParams) -> ResolverFuture + Send + Sync>;

/// Field resolvers of one subschema. Fields without an entry read the parent's property of the
/// same name.
#[derive(Clone, Default)]
pub struct ResolverMap {
    inner: HashMap<FieldCoordinate, ResolverFn>,
}

impl fmt::Debug for ResolverMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut coordinates: Vec<String> = self.inner.keys().map(|c| c.to_string()).collect();
        coordinates.sort();
        f.debug_struct("ResolverMap")
            .field("coordinates", &coordinates)
            .finish()
    }
}

impl ResolverMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F, Fut>(&mut self, type_name: &str, field_name: &str, resolver: F)
    where
        F: Fn(ResolverParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ResolverError>> + Send + 'static,
    {
        self.inner.insert(
            FieldCoordinate::new(type_name, field_name),
            Arc::new(move |params| resolver(params).boxed()),
        );
    }

    pub fn insert_sync<F>(&mut self, type_name: &str, field_name: &str, resolver: F)
    where
        F: Fn(ResolverParams) -> Result<Value, ResolverError> + Send + Sync + 'static,
    {
        self.inner.insert(
            FieldCoordinate::new(type_name, field_name),
            Arc::new(move |params| futures::future::ready(resolver(params)).boxed()),
        );
    }

    pub fn get(&self, type_name: &str, field_name: &str) -> Option<&ResolverFn> {
        self.inner
            .get(&FieldCoordinate::new(type_name, field_name))
    }

    pub fn contains(&self, type_name: &str, field_name: &str) -> bool {
        self.get(type_name, field_name).is_some()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = &FieldCoordinate> {
        self.inner.keys()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn sync_and_async_resolvers_share_a_signature() {
        let mut resolvers = ResolverMap::new();
        resolvers.insert("Query", "greeting", |params: ResolverParams| async move {
            Ok::<_, ResolverError>(json!(format!(
                "hello {}",
                params.args["name"].as_str().unwrap_or("?")
            )))
        });
        resolvers.insert_sync("Client", "name", |_| Ok(json!("hi")));

        let params = |args: Value| ResolverParams {
            parent: Value::Null,
            args: args.as_object().cloned().unwrap_or_default(),
            context: ResolverContext::detached("test", FieldCoordinate::new("Query", "greeting")),
        };

        let greeting = resolvers.get("Query", "greeting").unwrap();
        assert_eq!(
            greeting(params(json!({ "name": "feeds" }))).await,
            Ok(json!("hello feeds"))
        );

        let name = resolvers.get("Client", "name").unwrap();
        assert_eq!(name(params(json!({}))).await, Ok(json!("hi")));

        assert!(!resolvers.contains("Client", "tenantCode"));
    }
}
