use hive_stitching_composition::{ResolverError, Subschema};
use serde_json::{json, Map};

use crate::tests::testkit::{feeds, feeds_with, model, model_with, TestGateway};

#[tokio::test]
async fn non_null_violation_nulls_the_nearest_nullable_ancestor() {
    let feeds = feeds_with(
        r#"
type Query { getCredential(id: ID!): Credential }
type Credential { _id: ID! client: Client! }
type Client { _id: ID! tenantCode: String }
"#,
    )
    .build()
    .unwrap();
    // Declared last, the stricter definition of Client.tenantCode is the supergraph's.
    let model = model_with(
        r#"
type Query { getClient(id: ID!): Client }
type Client { _id: ID! name: String tenantCode: String! }
"#,
    )
    .build()
    .unwrap();
    let gateway = TestGateway::new(&[feeds, model]);

    let response = gateway
        .run_json(r#"{ getCredential(id: "valid-credential-id") { _id client { tenantCode } } }"#)
        .await;

    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "getCredential": null
      },
      "errors": [
        {
          "message": "Cannot return null for non-nullable field Client.tenantCode.",
          "path": [
            "getCredential",
            "client",
            "tenantCode"
          ],
          "extensions": {
            "code": "NON_NULL_VIOLATION"
          }
        }
      ]
    }
    "###);
}

#[tokio::test]
async fn failing_non_null_root_field_nulls_data() {
    let subschema = Subschema::builder("feeds", "type Query { getWhatever: String getRequired: String! }")
        .sync_resolver("Query", "getRequired", |_| Err(ResolverError::new("required failed")))
        .build()
        .unwrap();
    let gateway = TestGateway::new(&[subschema]);

    let response = gateway.run_json("{ getWhatever getRequired }").await;

    assert_eq!(
        response,
        json!({
            "data": null,
            "errors": [{
                "message": "required failed",
                "path": ["getRequired"],
                "extensions": { "code": "RESOLVER_ERROR" }
            }]
        })
    );
}

#[tokio::test]
async fn root_resolver_errors_stay_on_their_field() {
    let gateway = TestGateway::new(&[feeds(), model()]);

    let response = gateway
        .run_json(
            r#"{ broken: getClient(id: "broken") { name } ok: getClient(id: "c1") { name } getWhatever }"#,
        )
        .await;

    assert_eq!(
        response,
        json!({
            "data": {
                "broken": null,
                "ok": { "name": "hi" },
                "getWhatever": null
            },
            "errors": [{
                "message": "no client with id \"broken\"",
                "path": ["broken"],
                "extensions": { "code": "RESOLVER_ERROR" }
            }]
        })
    );
}

#[tokio::test]
async fn field_unknown_to_the_merge_owner_is_unresolvable() {
    let extras = Subschema::builder(
        "extras",
        "type Query { getExtra: Client } type Client { _id: ID! nickname: String }",
    )
    .build()
    .unwrap();
    let gateway = TestGateway::new(&[feeds(), model(), extras]);

    let response = gateway
        .run_json(r#"{ getCredential(id: "valid-credential-id") { client { name nickname } } }"#)
        .await;

    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "getCredential": {
          "client": {
            "name": "hi",
            "nickname": null
          }
        }
      },
      "errors": [
        {
          "message": "Cannot resolve field \"Client.nickname\": merge owner \"model\" does not declare it",
          "path": [
            "getCredential",
            "client",
            "nickname"
          ],
          "extensions": {
            "code": "UNRESOLVABLE_FIELD"
          }
        }
      ]
    }
    "###);
    assert!(gateway.events.requests_to("extras").is_empty());
}

#[tokio::test]
async fn request_errors_have_no_data() {
    let gateway = TestGateway::new(&[feeds(), model()]);

    let unknown_field = gateway.run_json("{ getCredential(id: \"x\") { nope } }").await;
    let mutation = gateway.run_json("mutation { getWhatever }").await;
    let missing_variable = gateway
        .executor
        .run(
            "query($id: ID!) { getCredential(id: $id) { _id } }",
            None,
            Map::new(),
        )
        .await
        .to_json();

    insta::assert_json_snapshot!([unknown_field, mutation, missing_variable], @r###"
    [
      {
        "errors": [
          {
            "message": "Cannot query field \"nope\" on type \"Credential\"",
            "extensions": {
              "code": "GRAPHQL_VALIDATION_FAILED"
            }
          }
        ]
      },
      {
        "errors": [
          {
            "message": "mutation operations are not supported, only queries can be stitched",
            "extensions": {
              "code": "OPERATION_RESOLUTION_FAILURE"
            }
          }
        ]
      },
      {
        "errors": [
          {
            "message": "Variable \"$id\" of required type \"ID!\" was not provided",
            "extensions": {
              "code": "BAD_USER_INPUT"
            }
          }
        ]
      }
    ]
    "###);
    assert!(gateway.events.events().is_empty());
}

#[tokio::test]
async fn parse_failures_are_reported() {
    let gateway = TestGateway::new(&[feeds(), model()]);

    let response = gateway.run("{ getCredential(id: ").await;

    assert_eq!(response.data, None);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].code(), Some("GRAPHQL_PARSE_FAILED"));
}

#[tokio::test]
async fn nested_errors_keep_their_path_in_client_field_order() {
    let feeds = feeds_with(
        r#"
type Query { getCredential(id: ID!): Credential }
type Credential { _id: ID! client: Client }
type Client { _id: ID! label: String }
"#,
    )
    .sync_resolver("Client", "label", |_| Err(ResolverError::new("label failed")))
    .build()
    .unwrap();
    let model = model_with(
        r#"
type Query { getClient(id: ID!): Client }
type Client { _id: ID! tenantCode: String }
"#,
    )
    .sync_resolver("Client", "tenantCode", |_| Err(ResolverError::new("tenant failed")))
    .build()
    .unwrap();
    let gateway = TestGateway::new(&[feeds, model]);

    let response = gateway
        .run_json(r#"{ getCredential(id: "valid-credential-id") { client { tenantCode label } _id } }"#)
        .await;

    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "getCredential": {
          "client": {
            "tenantCode": null,
            "label": null
          },
          "_id": "valid-credential-id"
        }
      },
      "errors": [
        {
          "message": "tenant failed",
          "path": [
            "getCredential",
            "client",
            "tenantCode"
          ],
          "extensions": {
            "code": "RESOLVER_ERROR"
          }
        },
        {
          "message": "label failed",
          "path": [
            "getCredential",
            "client",
            "label"
          ],
          "extensions": {
            "code": "RESOLVER_ERROR"
          }
        }
      ]
    }
    "###);
}
