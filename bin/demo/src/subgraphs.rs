use hive_stitching_composition::{CompositionError, EntityAnnotation, ResolverError, Subschema};
use serde_json::{json, Value};

pub const VALID_CREDENTIAL_ID: &str = "valid-credential-id";

pub fn feeds(sdl: &str) -> Result<Subschema, CompositionError> {
    Subschema::builder("feeds", sdl)
        .resolver("Query", "getCredential", |params| async move {
            let id = params.args.get("id").and_then(Value::as_str).unwrap_or_default();
            params.context.log("getCredential called", json!({ "id": id }));

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
            let id = params.parent["_id"].as_str().unwrap_or_default();
            params.context.log("Credential.name called", json!({ "_id": id }));

            Ok(json!(format!("Other lazy resolvers still work (_id={})", id)))
        })
        .build()
}

pub fn model(sdl: &str) -> Result<Subschema, CompositionError> {
    Subschema::builder("model", sdl)
        .entity(
            EntityAnnotation::new("Client")
                .key(["_id"])
                .entry_field("getClient")
                .key_argument("_id", "id"),
        )
        .sync_resolver("Query", "getClient", |params| {
            let id = params.args.get("id").cloned().unwrap_or(Value::Null);
            params.context.log("getClient called", json!({ "id": id }));

            Ok(json!({ "_id": id, "name": "A NAME", "tenantCode": "hello tenant" }))
        })
        .sync_resolver("Client", "name", |_| Ok(json!("hi")))
        .build()
}
