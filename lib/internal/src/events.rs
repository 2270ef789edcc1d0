//! Structured events emitted while composing and executing stitched queries.
//!
//! Core code never writes to a global output stream. Everything worth reporting goes through an
//! [`EventSink`] handed down by the caller, [`TracingEventSink`] being the default.

use std::{
    fmt::Debug,
    sync::{Arc, Mutex},
};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StitchingEvent {
    /// A sub-query is about to be sent to a subschema.
    SubschemaRequest { subschema: String, query: String },
    /// A stub is being completed through the entry field of its merge owner.
    EntityResolution {
        type_name: String,
        owner: String,
        path: String,
    },
    /// Emitted by resolver code through its context.
    Message {
        subschema: String,
        message: String,
        payload: Value,
    },
}

pub trait EventSink: Debug + Send + Sync {
    fn emit(&self, event: StitchingEvent);
}

pub type SharedEventSink = Arc<dyn EventSink>;

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: StitchingEvent) {
        match event {
            StitchingEvent::SubschemaRequest { subschema, query } => {
                debug!(subschema = %subschema, query = %query, "sending sub-query");
            }
            StitchingEvent::EntityResolution {
                type_name,
                owner,
                path,
            } => {
                debug!(type_name = %type_name, owner = %owner, path = %path, "resolving entity");
            }
            StitchingEvent::Message {
                subschema,
                message,
                payload,
            } => {
                info!(subschema = %subschema, payload = %payload, "{}", message);
            }
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<StitchingEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<StitchingEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Sub-queries received by `subschema`, in emission order.
    pub fn requests_to(&self, subschema: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                StitchingEvent::SubschemaRequest {
                    subschema: target,
                    query,
                } if target == subschema => Some(query),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: StitchingEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
