use std::time::Duration;

use async_trait::async_trait;
use hive_stitching_config::parse_yaml_config;
use serde_json::json;

use crate::{
    executors::{
        common::{SubschemaExecutionRequest, SubschemaExecutor},
        error::SubschemaExecutorError,
        local::LocalSubschemaExecutor,
        timeout::TimeoutExecutor,
    },
    response::subschema_response::SubschemaResponse,
    tests::testkit::{feeds, feeds_with, model, model_with, TestGateway},
    SubschemaExecutorMap,
};

const MIXED_QUERY: &str = r#"
{
  getClient(id: "c1") { tenantCode _id }
  getWhatever
  getCredential(id: "valid-credential-id") {
    name
    client { tenantCode name _id }
    _id
  }
}
"#;

#[tokio::test]
async fn random_latency_never_changes_the_response() {
    let local = TestGateway::new(&[feeds(), model()]);
    let expected = serde_json::to_string(&local.run(MIXED_QUERY).await).unwrap();

    let config = parse_yaml_config(
        r#"
transport:
  all:
    kind: simulated_remote
    max_delay: 3ms
"#
        .to_string(),
    )
    .unwrap();
    let remote = TestGateway::with_transport(&[feeds(), model()], &config.transport);

    for _ in 0..5 {
        let response = serde_json::to_string(&remote.run(MIXED_QUERY).await).unwrap();
        assert_eq!(response, expected);
    }

    let data = local.run(MIXED_QUERY).await.data.unwrap();
    assert_eq!(
        data.as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["getClient", "getWhatever", "getCredential"]
    );
    assert_eq!(
        data["getCredential"]["client"],
        json!({ "tenantCode": "hello tenant", "name": "hi", "_id": "some-client-id" })
    );
}

#[tokio::test]
async fn concurrent_entity_calls_under_random_latency_keep_list_order() {
    let subschemas = || {
        let feeds = feeds_with(
            r#"
type Query { getCredentials: [Credential!]! }
type Credential { _id: ID! client: Client }
type Client { _id: ID! }
"#,
        )
        .sync_resolver("Query", "getCredentials", |_| {
            Ok(json!([
                { "_id": "c1", "client": { "_id": "k1" } },
                { "_id": "c2", "client": { "_id": "k2" } },
                { "_id": "c3", "client": null },
                { "_id": "c4", "client": { "_id": "k4" } },
                { "_id": "c5", "client": { "_id": "k5" } }
            ]))
        })
        .build()
        .unwrap();
        let model = model_with(
            r#"
type Query { getClient(id: ID!): Client }
type Client { _id: ID! name: String tenantCode: String }
"#,
        )
        .sync_resolver("Client", "tenantCode", |params| {
            Ok(json!(format!("tenant of {}", params.parent["_id"].as_str().unwrap_or_default())))
        })
        .build()
        .unwrap();
        [feeds, model]
    };
    let expected = json!({
        "data": {
            "getCredentials": [
                { "_id": "c1", "client": { "tenantCode": "tenant of k1", "name": "hi" } },
                { "_id": "c2", "client": { "tenantCode": "tenant of k2", "name": "hi" } },
                { "_id": "c3", "client": null },
                { "_id": "c4", "client": { "tenantCode": "tenant of k4", "name": "hi" } },
                { "_id": "c5", "client": { "tenantCode": "tenant of k5", "name": "hi" } }
            ]
        }
    });

    let config = parse_yaml_config(
        r#"
transport:
  all:
    kind: simulated_remote
    max_delay: 10ms
"#
        .to_string(),
    )
    .unwrap();
    let remote = TestGateway::with_transport(&subschemas(), &config.transport);

    for _ in 0..5 {
        let response = remote
            .run_json("{ getCredentials { _id client { tenantCode name } } }")
            .await;
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            serde_json::to_string(&expected).unwrap()
        );
    }
    assert_eq!(remote.events.requests_to("model").len(), 4 * 5);
}

struct SlowExecutor {
    delay: Duration,
    inner: LocalSubschemaExecutor,
}

#[async_trait]
impl SubschemaExecutor for SlowExecutor {
    async fn execute(
        &self,
        execution_request: SubschemaExecutionRequest,
    ) -> Result<SubschemaResponse, SubschemaExecutorError> {
        tokio::time::sleep(self.delay).await;
        self.inner.execute(execution_request).await
    }
}

#[tokio::test]
async fn timeout_becomes_a_transport_error_on_the_affected_field() {
    let subschemas = [feeds(), model()];
    let mut executors = SubschemaExecutorMap::new();
    executors.insert_boxed_arc(
        "feeds".to_string(),
        LocalSubschemaExecutor::try_new(&subschemas[0])
            .unwrap()
            .to_boxed_arc(),
    );
    let slow_model = SlowExecutor {
        delay: Duration::from_millis(500),
        inner: LocalSubschemaExecutor::try_new(&subschemas[1]).unwrap(),
    };
    executors.insert_boxed_arc(
        "model".to_string(),
        TimeoutExecutor::new("model", Duration::from_millis(20), slow_model.to_boxed_arc())
            .to_boxed_arc(),
    );
    let gateway = TestGateway::with_executors(&subschemas, executors);

    let response = gateway
        .run_json(r#"{ getCredential(id: "valid-credential-id") { _id client { tenantCode } } }"#)
        .await;

    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "getCredential": {
          "_id": "valid-credential-id",
          "client": {
            "tenantCode": null
          }
        }
      },
      "errors": [
        {
          "message": "Failed to execute request to subschema \"model\": Request to subschema \"model\" timed out after 20ms",
          "path": [
            "getCredential",
            "client",
            "tenantCode"
          ],
          "extensions": {
            "code": "TRANSPORT_ERROR"
          }
        }
      ]
    }
    "###);
}

#[tokio::test]
async fn root_transport_failure_marks_every_field_of_the_group() {
    let subschemas = [feeds(), model()];
    let mut executors = SubschemaExecutorMap::new();
    executors.insert_boxed_arc(
        "feeds".to_string(),
        LocalSubschemaExecutor::try_new(&subschemas[0])
            .unwrap()
            .to_boxed_arc(),
    );
    let gateway = TestGateway::with_executors(&subschemas, executors);

    let response = gateway
        .run_json(r#"{ a: getClient(id: "c1") { _id } getWhatever b: getClient(id: "c2") { _id } }"#)
        .await;

    let message = "Failed to execute request to subschema \"model\": Subschema executor not found for subschema \"model\"";
    assert_eq!(
        response,
        json!({
            "data": { "a": null, "getWhatever": null, "b": null },
            "errors": [
                { "message": message, "path": ["a"], "extensions": { "code": "TRANSPORT_ERROR" } },
                { "message": message, "path": ["b"], "extensions": { "code": "TRANSPORT_ERROR" } }
            ]
        })
    );
}
