use std::sync::{Arc, Once};

use hive_stitching_composition::{
    compose, EntityAnnotation, ResolverError, Subschema, SubschemaBuilder,
};
use hive_stitching_config::transport::TransportConfig;
use hive_stitching_internal::events::MemoryEventSink;
use lazy_static::lazy_static;
use serde_json::{json, Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{DelegatingExecutor, ExecutionResponse, SubschemaExecutorMap};

fn init_test_logger_internal() {
    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_bracketed_fields(true)
        .with_deferred_spans(false)
        .with_wraparound(25)
        .with_indent_lines(true)
        .with_timer(tracing_tree::time::Uptime::default())
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_targets(false);

    let _ = tracing_subscriber::registry()
        .with(tree_layer)
        .with(EnvFilter::from_default_env())
        .try_init();
}

lazy_static! {
    static ref TRACING_INIT: Once = Once::new();
}

pub fn init_logger() {
    TRACING_INIT.call_once(|| {
        init_test_logger_internal();
    });
}

pub const VALID_CREDENTIAL_ID: &str = "valid-credential-id";

pub const FEEDS_SDL: &str = r#"
type Query {
  getCredential(id: ID!): Credential
  getWhatever: String
}

type Credential {
  _id: ID!
  clientId: ID!
  client: Client!
  name: String
}

type Client {
  _id: ID!
}
"#;

pub const MODEL_SDL: &str = r#"
type Query {
  getClient(id: ID!): Client
}

type Client {
  _id: ID!
  name: String
  tenantCode: String
}
"#;

/// Feeds resolvers over any SDL declaring `Query.getCredential`.
pub fn feeds_with(sdl: &str) -> SubschemaBuilder {
    Subschema::builder("feeds", sdl)
        .resolver("Query", "getCredential", |params| async move {
            let id = params.args.get("id").and_then(Value::as_str).unwrap_or_default();
            params
                .context
                .log("resolving credential", json!({ "id": id }));

            Ok::<_, ResolverError>(match id {
                VALID_CREDENTIAL_ID => json!({
                    "_id": id,
                    "clientId": "some-client-id",
                    "client": { "_id": "some-client-id" }
                }),
                _ => Value::Null,
            })
        })
        .sync_resolver("Credential", "name", |params| {
            Ok(json!(format!(
                "Other lazy resolvers still work (_id={})",
                params.parent["_id"].as_str().unwrap_or_default()
            )))
        })
}

pub fn feeds() -> Subschema {
    feeds_with(FEEDS_SDL).build().unwrap()
}

/// Model resolvers over any SDL declaring `Query.getClient`, with `Client` merged by `_id`.
pub fn model_with(sdl: &str) -> SubschemaBuilder {
    Subschema::builder("model", sdl)
        .entity(
            EntityAnnotation::new("Client")
                .key(["_id"])
                .entry_field("getClient")
                .key_argument("_id", "id"),
        )
        .resolver("Query", "getClient", |params| async move {
            let id = params.args.get("id").cloned().unwrap_or(Value::Null);
            if id == json!("broken") {
                Err(ResolverError::new("no client with id \"broken\""))
            } else {
                Ok(json!({ "_id": id, "name": "A NAME", "tenantCode": "hello tenant" }))
            }
        })
        .sync_resolver("Client", "name", |_| Ok(json!("hi")))
}

pub fn model() -> Subschema {
    model_with(MODEL_SDL).build().unwrap()
}

/// A delegating executor recording every event in memory.
pub struct TestGateway {
    pub executor: DelegatingExecutor,
    pub events: Arc<MemoryEventSink>,
}

impl TestGateway {
    pub fn new(subschemas: &[Subschema]) -> Self {
        Self::with_transport(subschemas, &TransportConfig::default())
    }

    pub fn with_transport(subschemas: &[Subschema], transport: &TransportConfig) -> Self {
        let executors = SubschemaExecutorMap::from_subschemas(subschemas, transport).unwrap();
        Self::with_executors(subschemas, executors)
    }

    pub fn with_executors(subschemas: &[Subschema], executors: SubschemaExecutorMap) -> Self {
        init_logger();
        let supergraph = compose(subschemas).unwrap();
        let events = MemoryEventSink::new();
        let executor =
            DelegatingExecutor::new(Arc::new(supergraph), executors).with_event_sink(events.clone());

        TestGateway { executor, events }
    }

    pub async fn run(&self, query: &str) -> ExecutionResponse {
        self.executor.run(query, None, Map::new()).await
    }

    pub async fn run_json(&self, query: &str) -> Value {
        self.run(query).await.to_json()
    }
}
