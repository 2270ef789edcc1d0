use std::{collections::HashMap, sync::Arc};

use futures::future::{join_all, ready, BoxFuture, FutureExt};
use graphql_parser::schema::Type;
use hive_stitching_composition::{utils::parsing::named_type, MergeConfig, Supergraph, QUERY_TYPE};
use hive_stitching_internal::events::{SharedEventSink, StitchingEvent, TracingEventSink};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::{
    context::ExecutionContext,
    execution::{
        error::{FieldError, RESOLVER_ERROR_CODE},
        operation::{normalize_operation, FieldSelection},
        query_builder::{is_remote, key_alias, QueryBuilder, ENTITY_ALIAS, KEY_ALIAS_PREFIX},
    },
    executors::map::SubschemaExecutorMap,
    response::{
        graphql_error::{display_path, GraphQLError, GraphQLErrorPathSegment},
        merge::merge_missing_fields,
        ExecutionResponse,
    },
};

type ResponsePath = Vec<GraphQLErrorPathSegment>;

/// Runs client queries against the supergraph by delegating every field to the subschema that
/// can answer it.
pub struct DelegatingExecutor {
    supergraph: Arc<Supergraph>,
    executors: SubschemaExecutorMap,
    events: SharedEventSink,
}

impl DelegatingExecutor {
    pub fn new(supergraph: Arc<Supergraph>, executors: SubschemaExecutorMap) -> Self {
        DelegatingExecutor {
            supergraph,
            executors,
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: SharedEventSink) -> Self {
        self.events = events;
        self
    }

    pub fn supergraph(&self) -> &Supergraph {
        &self.supergraph
    }

    #[instrument(level = "debug", skip_all, fields(operation_name = ?operation_name))]
    pub async fn run(
        &self,
        query: &str,
        operation_name: Option<&str>,
        variables: Map<String, Value>,
    ) -> ExecutionResponse {
        let ctx = ExecutionContext::new(&self.supergraph, &self.executors, self.events.clone());
        ctx.execute_operation(query, operation_name, &variables).await
    }
}

/// Executes a single-operation document, reporting events through `tracing`.
pub async fn execute_query(
    supergraph: &Supergraph,
    executors: &SubschemaExecutorMap,
    query: &str,
    variables: Map<String, Value>,
) -> ExecutionResponse {
    let ctx = ExecutionContext::new(supergraph, executors, Arc::new(TracingEventSink));
    ctx.execute_operation(query, None, &variables).await
}

/// A completed value with the errors raised below it.
///
/// `value` is `None` when a null reached a non-null position and must bubble to the parent.
#[derive(Debug, Default)]
struct Completed {
    value: Option<Value>,
    errors: Vec<GraphQLError>,
}

impl Completed {
    fn value(value: Value) -> Self {
        Completed {
            value: Some(value),
            errors: vec![],
        }
    }
}

#[derive(Debug, Default)]
struct EntityResolution {
    data: Option<Map<String, Value>>,
    errors: Vec<GraphQLError>,
}

impl<'a> ExecutionContext<'a> {
    pub async fn execute_operation(
        &self,
        query: &str,
        operation_name: Option<&str>,
        variables: &Map<String, Value>,
    ) -> ExecutionResponse {
        let operation = match normalize_operation(self.supergraph, query, operation_name, variables)
        {
            Ok(operation) => operation,
            Err(error) => {
                debug!(error = %error, "request rejected before execution");
                return ExecutionResponse::from_errors(vec![error.into()]);
            }
        };

        self.execute_root(&operation.selections).await
    }

    async fn execute_root(&self, selections: &[FieldSelection]) -> ExecutionResponse {
        let mut groups: IndexMap<&str, Vec<&FieldSelection>> = IndexMap::new();
        let mut completed: HashMap<&str, Completed> = HashMap::new();

        for selection in selections.iter().filter(|s| !s.is_typename()) {
            match self.supergraph.owner(QUERY_TYPE, &selection.name) {
                Some(owner) => groups.entry(owner).or_default().push(selection),
                None => {
                    let path = vec![selection.response_key.as_str().into()];
                    let reason = "no subschema owns it".to_string();
                    completed.insert(
                        selection.response_key.as_str(),
                        unresolvable_field(selection, path, reason),
                    );
                }
            }
        }

        let group_results = join_all(groups.iter().map(|(owner, fields)| async move {
            let results = self.execute_root_group(owner, fields).await;
            fields
                .iter()
                .map(|field| field.response_key.as_str())
                .zip(results)
                .collect::<Vec<_>>()
        }))
        .await;
        completed.extend(group_results.into_iter().flatten());

        let mut data = Map::new();
        let mut errors = vec![];
        let mut data_is_null = false;
        for selection in selections {
            if selection.is_typename() {
                data.insert(
                    selection.response_key.clone(),
                    Value::String(QUERY_TYPE.to_string()),
                );
                continue;
            }
            let Some(result) = completed.remove(selection.response_key.as_str()) else {
                continue;
            };
            errors.extend(result.errors);
            match result.value {
                Some(value) => {
                    data.insert(selection.response_key.clone(), value);
                }
                None => data_is_null = true,
            }
        }

        errors.sort_by_cached_key(|error| client_order(error.path.as_deref(), selections));

        ExecutionResponse {
            data: Some(match data_is_null {
                true => Value::Null,
                false => Value::Object(data),
            }),
            errors,
        }
    }

    /// Sends the root fields owned by one subschema as a single sub-query.
    async fn execute_root_group(&self, owner: &str, fields: &[&FieldSelection]) -> Vec<Completed> {
        let Some(subschema) = self.supergraph.subschema(owner) else {
            return fields
                .iter()
                .map(|field| {
                    let path = vec![field.response_key.as_str().into()];
                    unresolvable_field(field, path, format!("unknown subschema \"{}\"", owner))
                })
                .collect();
        };

        let sub_query = QueryBuilder::new(self.supergraph, subschema).root(fields);
        let (data, relocated) = match self.call_subschema(owner, sub_query).await {
            Ok(response) => {
                let data = match response.data {
                    Some(Value::Object(data)) => data,
                    _ => Map::new(),
                };
                (data, relocate_root_errors(response.errors, fields))
            }
            Err(error) => {
                debug!(subschema = owner, error = %error, "root sub-query failed");
                let relocated = fields
                    .iter()
                    .map(|field| {
                        let path = vec![field.response_key.as_str().into()];
                        vec![FieldError::transport(owner, &error).into_graphql_error(path)]
                    })
                    .collect::<Vec<_>>();
                (Map::new(), relocated)
            }
        };

        let completions = join_all(fields.iter().zip(&relocated).map(|(field, known)| {
            let value = data
                .get(&field.response_key)
                .cloned()
                .unwrap_or(Value::Null);
            let path = vec![field.response_key.as_str().into()];
            self.complete_value(field, &field.field_type, value, owner, path, known)
        }))
        .await;

        completions
            .into_iter()
            .zip(relocated)
            .map(|(mut completed, mut errors)| {
                errors.append(&mut completed.errors);
                completed.errors = errors;
                completed
            })
            .collect()
    }

    /// Completes `value` against the declared type of `field`.
    ///
    /// `source` is the subschema that produced the value, `known` holds the errors already
    /// recorded for this part of the response.
    fn complete_value<'b>(
        &'b self,
        field: &'b FieldSelection,
        field_type: &'b Type<'static, String>,
        value: Value,
        source: &'b str,
        path: ResponsePath,
        known: &'b [GraphQLError],
    ) -> BoxFuture<'b, Completed> {
        async move {
            match field_type {
                Type::NonNullType(inner) => {
                    let mut completed = self
                        .complete_value(field, inner, value, source, path.clone(), known)
                        .await;
                    if matches!(completed.value, None | Some(Value::Null)) {
                        let already_reported = completed
                            .errors
                            .iter()
                            .chain(known)
                            .any(|error| error.is_under(&path));
                        if !already_reported {
                            completed.errors.push(
                                FieldError::NonNullViolation {
                                    coordinate: field.coordinate(),
                                }
                                .into_graphql_error(path),
                            );
                        }
                        completed.value = None;
                    }
                    completed
                }
                Type::ListType(inner) => {
                    let items = match value {
                        Value::Array(items) => items,
                        Value::Null => return Completed::value(Value::Null),
                        _ => return unexpected_value(field, path, "a list"),
                    };

                    let items = join_all(items.into_iter().enumerate().map(|(index, item)| {
                        let mut item_path = path.clone();
                        item_path.push(index.into());
                        self.complete_value(field, inner, item, source, item_path, known)
                    }))
                    .await;

                    let mut errors = vec![];
                    let mut values = Vec::with_capacity(items.len());
                    let mut bubbled = false;
                    for item in items {
                        errors.extend(item.errors);
                        match item.value {
                            Some(value) => values.push(value),
                            None => bubbled = true,
                        }
                    }

                    Completed {
                        value: Some(match bubbled {
                            true => Value::Null,
                            false => Value::Array(values),
                        }),
                        errors,
                    }
                }
                Type::NamedType(type_name) => match value {
                    Value::Null => Completed::value(Value::Null),
                    _ if self.supergraph.is_leaf_type(type_name) => Completed::value(value),
                    Value::Object(object) => {
                        self.complete_object(type_name, &field.selections, object, source, path, known)
                            .await
                    }
                    _ => unexpected_value(field, path, "an object"),
                },
            }
        }
        .boxed()
    }

    /// Completes an object produced by `source`, fetching the fields it cannot answer from the
    /// merge owner of the type first.
    fn complete_object<'b>(
        &'b self,
        type_name: &'b str,
        selections: &'b [FieldSelection],
        mut object: Map<String, Value>,
        source: &'b str,
        path: ResponsePath,
        known: &'b [GraphQLError],
    ) -> BoxFuture<'b, Completed> {
        async move {
            let supergraph: &'a Supergraph = self.supergraph;
            let source_state = supergraph.subschema(source);
            let is_remote_field = |selection: &FieldSelection| {
                source_state.is_some_and(|state| is_remote(state, type_name, selection))
            };

            let mut errors = vec![];
            let mut remote_source = source;
            let mut unresolvable: HashMap<&str, String> = HashMap::new();

            let remote_fields = selections
                .iter()
                .filter(|selection| is_remote_field(*selection))
                .collect::<Vec<_>>();
            if !remote_fields.is_empty() {
                match supergraph.merge_config(type_name) {
                    Some(config) if config.owner != source => {
                        let (fetchable, undeclared): (Vec<_>, Vec<_>) =
                            remote_fields.into_iter().partition(|selection| {
                                supergraph.owner(type_name, &selection.name)
                                    == Some(config.owner.as_str())
                            });
                        for selection in undeclared {
                            unresolvable.insert(
                                selection.response_key.as_str(),
                                format!("merge owner \"{}\" does not declare it", config.owner),
                            );
                        }

                        if !fetchable.is_empty() {
                            match self.resolve_entity(config, &object, &fetchable, &path).await {
                                Ok(entity) => {
                                    if let Some(data) = entity.data {
                                        merge_missing_fields(&mut object, data);
                                    }
                                    errors.extend(entity.errors);
                                }
                                Err(error) => {
                                    debug!(path = %display_path(&path), error = %error, "stub cannot be merged");
                                    return Completed {
                                        value: Some(Value::Null),
                                        errors: vec![error.into_graphql_error(path)],
                                    };
                                }
                            }
                            remote_source = config.owner.as_str();
                        }
                    }
                    Some(config) => {
                        for selection in remote_fields {
                            unresolvable.insert(
                                selection.response_key.as_str(),
                                format!("merge owner \"{}\" does not declare it", config.owner),
                            );
                        }
                    }
                    None => {
                        for selection in remote_fields {
                            unresolvable.insert(
                                selection.response_key.as_str(),
                                format!(
                                    "subschema \"{}\" does not declare it and \"{}\" has no merge configuration",
                                    source, type_name
                                ),
                            );
                        }
                    }
                }
            }

            let known_here = known
                .iter()
                .chain(errors.iter())
                .cloned()
                .collect::<Vec<_>>();
            let completions = join_all(selections.iter().map(|selection| {
                let mut field_path = path.clone();
                field_path.push(selection.response_key.as_str().into());

                if selection.is_typename() {
                    return ready(Completed::value(Value::String(type_name.to_string()))).boxed();
                }
                if let Some(reason) = unresolvable.get(selection.response_key.as_str()) {
                    return ready(unresolvable_field(selection, field_path, reason.clone())).boxed();
                }

                let field_source = match is_remote_field(selection) {
                    true => remote_source,
                    false => source,
                };
                let value = object
                    .get(&selection.response_key)
                    .cloned()
                    .unwrap_or(Value::Null);
                self.complete_value(
                    selection,
                    &selection.field_type,
                    value,
                    field_source,
                    field_path,
                    &known_here,
                )
            }))
            .await;

            let mut data = Map::new();
            let mut bubbled = false;
            for (selection, completed) in selections.iter().zip(completions) {
                errors.extend(completed.errors);
                match completed.value {
                    Some(value) => {
                        data.insert(selection.response_key.clone(), value);
                    }
                    None => bubbled = true,
                }
            }

            Completed {
                value: Some(match bubbled {
                    true => Value::Null,
                    false => Value::Object(data),
                }),
                errors,
            }
        }
        .boxed()
    }

    /// Fetches `fields` of the stub at `path` through the entry field of the merge owner.
    async fn resolve_entity(
        &self,
        config: &MergeConfig,
        stub: &Map<String, Value>,
        fields: &[&FieldSelection],
        path: &[GraphQLErrorPathSegment],
    ) -> Result<EntityResolution, FieldError> {
        let mut key = Map::new();
        for key_field in &config.required_selection {
            match stub.get(&key_alias(key_field)) {
                Some(value) if !value.is_null() => {
                    key.insert(key_field.clone(), value.clone());
                }
                _ => {
                    return Err(FieldError::MergeKeyMissing {
                        type_name: config.type_name.clone(),
                        key_field: key_field.clone(),
                    })
                }
            }
        }

        self.events.emit(StitchingEvent::EntityResolution {
            type_name: config.type_name.clone(),
            owner: config.owner.clone(),
            path: display_path(path),
        });

        let Some(owner_state) = self.supergraph.subschema(&config.owner) else {
            return Ok(EntityResolution::default());
        };
        let arguments = config.args_from_key.apply(&key);
        let sub_query = QueryBuilder::new(self.supergraph, owner_state).entity(
            &config.entry_field,
            &arguments,
            &config.type_name,
            fields,
        );

        // Errors without a usable location land on the first fetched field.
        let mut trigger_path = path.to_vec();
        if let Some(first) = fields.first() {
            trigger_path.push(first.response_key.as_str().into());
        }

        match self.call_subschema(&config.owner, sub_query).await {
            Ok(response) => {
                let data = match response.data {
                    Some(Value::Object(mut data)) => match data.remove(ENTITY_ALIAS) {
                        Some(Value::Object(entity)) => Some(entity),
                        _ => None,
                    },
                    _ => None,
                };
                let errors = response
                    .errors
                    .into_iter()
                    .map(|error| {
                        relocate_entity_error(error, path, &trigger_path, &config.type_name, fields)
                    })
                    .collect();

                Ok(EntityResolution { data, errors })
            }
            Err(error) => {
                debug!(subschema = %config.owner, error = %error, "entity sub-query failed");
                Ok(EntityResolution {
                    data: None,
                    errors: vec![
                        FieldError::transport(&config.owner, &error).into_graphql_error(trigger_path)
                    ],
                })
            }
        }
    }
}

fn unresolvable_field(selection: &FieldSelection, path: ResponsePath, reason: String) -> Completed {
    let error = FieldError::UnresolvableField {
        coordinate: selection.coordinate(),
        reason,
    }
    .into_graphql_error(path);

    Completed {
        value: match selection.field_type {
            Type::NonNullType(_) => None,
            _ => Some(Value::Null),
        },
        errors: vec![error],
    }
}

fn unexpected_value(field: &FieldSelection, path: ResponsePath, expected: &str) -> Completed {
    let error = FieldError::Resolver(format!(
        "Expected {} for field \"{}\"",
        expected,
        field.coordinate()
    ))
    .into_graphql_error(path);

    Completed {
        value: Some(Value::Null),
        errors: vec![error],
    }
}

fn with_resolver_code(error: GraphQLError) -> GraphQLError {
    if error.code().is_some() {
        error
    } else {
        error.with_code(RESOLVER_ERROR_CODE)
    }
}

/// Sort key of an error path in client field order; path-less errors go last.
fn client_order(
    path: Option<&[GraphQLErrorPathSegment]>,
    selections: &[FieldSelection],
) -> Vec<usize> {
    let Some(path) = path else {
        return vec![usize::MAX];
    };

    let mut current = selections;
    let mut order = Vec::with_capacity(path.len());
    for segment in path {
        match segment {
            GraphQLErrorPathSegment::Index(index) => order.push(*index),
            GraphQLErrorPathSegment::String(response_key) => {
                match current.iter().position(|s| s.response_key == *response_key) {
                    Some(position) => {
                        order.push(position);
                        current = &current[position].selections;
                    }
                    None => {
                        order.push(usize::MAX);
                        break;
                    }
                }
            }
        }
    }

    order
}

/// Detects errors raised on an internal key alias: the stub above it lacks its key.
///
/// `path` starts in `fields`, whose parent type is `parent_type`. Returns the length of the stub
/// path within `path` and the error to report there.
fn missing_key_error<'f>(
    path: &[GraphQLErrorPathSegment],
    fields: &[&'f FieldSelection],
    parent_type: &'f str,
) -> Option<(usize, FieldError)> {
    let (alias_index, key_field) = path
        .iter()
        .enumerate()
        .find_map(|(index, segment)| match segment {
            GraphQLErrorPathSegment::String(name) => name
                .strip_prefix(KEY_ALIAS_PREFIX)
                .map(|key_field| (index, key_field)),
            GraphQLErrorPathSegment::Index(_) => None,
        })?;

    let mut type_name = parent_type;
    let mut candidates = fields.to_vec();
    for segment in &path[..alias_index] {
        let GraphQLErrorPathSegment::String(response_key) = segment else {
            continue;
        };
        let selection: &'f FieldSelection = *candidates
            .iter()
            .find(|selection| selection.response_key == *response_key)?;
        type_name = named_type(&selection.field_type);
        candidates = selection.selections.iter().collect();
    }

    Some((
        alias_index,
        FieldError::MergeKeyMissing {
            type_name: type_name.to_string(),
            key_field: key_field.to_string(),
        },
    ))
}

/// Splits the errors of a root sub-query by the root field they belong to.
fn relocate_root_errors(
    errors: Vec<GraphQLError>,
    fields: &[&FieldSelection],
) -> Vec<Vec<GraphQLError>> {
    let mut relocated = vec![Vec::new(); fields.len()];

    for error in errors {
        let missing_key = error.path.as_deref().and_then(|path| {
            missing_key_error(path, fields, QUERY_TYPE)
                .map(|(stub_len, key_error)| key_error.into_graphql_error(path[..stub_len].to_vec()))
        });
        let error = match missing_key {
            Some(key_error) => key_error,
            None => with_resolver_code(error),
        };
        let index = match error.path.as_deref() {
            Some([GraphQLErrorPathSegment::String(response_key), ..]) => fields
                .iter()
                .position(|field| field.response_key == *response_key),
            _ => None,
        };

        match (index, fields.first()) {
            (Some(index), _) => relocated[index].push(error),
            (None, Some(first)) => {
                relocated[0].push(error.with_path(vec![first.response_key.as_str().into()]))
            }
            (None, None) => {}
        }
    }

    relocated
}

/// Rebases an error of an entity sub-query onto the stub it completes.
fn relocate_entity_error(
    error: GraphQLError,
    stub_path: &[GraphQLErrorPathSegment],
    trigger_path: &[GraphQLErrorPathSegment],
    type_name: &str,
    fields: &[&FieldSelection],
) -> GraphQLError {
    let rest = match error.path.as_deref() {
        Some([GraphQLErrorPathSegment::String(alias), rest @ ..]) if alias.as_str() == ENTITY_ALIAS => {
            Some(rest)
        }
        _ => None,
    };
    let Some(rest) = rest else {
        return with_resolver_code(error).with_path(trigger_path.to_vec());
    };

    if let Some((stub_len, key_error)) = missing_key_error(rest, fields, type_name) {
        let path = stub_path.iter().chain(&rest[..stub_len]).cloned().collect();
        return key_error.into_graphql_error(path);
    }

    let path = stub_path.iter().chain(rest).cloned().collect();
    with_resolver_code(error).with_path(path)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn path(segments: &[&str]) -> ResponsePath {
        segments.iter().map(|segment| (*segment).into()).collect()
    }

    fn selection(
        name: &str,
        parent_type: &str,
        field_type: &str,
        selections: Vec<FieldSelection>,
    ) -> FieldSelection {
        FieldSelection {
            response_key: name.to_string(),
            name: name.to_string(),
            arguments: vec![],
            parent_type: parent_type.to_string(),
            field_type: Type::NamedType(field_type.to_string()),
            selections,
        }
    }

    #[test]
    fn entity_errors_are_rebased_onto_the_stub() {
        let error = GraphQLError::from("boom").with_path(path(&["_entity", "tenantCode"]));

        let relocated = relocate_entity_error(
            error,
            &path(&["getCredential", "client"]),
            &path(&["getCredential", "client", "name"]),
            "Client",
            &[],
        );

        insta::assert_snapshot!(serde_json::to_string(&relocated).unwrap(), @r#"{"message":"boom","path":["getCredential","client","tenantCode"],"extensions":{"code":"RESOLVER_ERROR"}}"#);
    }

    #[test]
    fn pathless_entity_errors_land_on_the_first_fetched_field() {
        let error = GraphQLError::from("boom").with_code("FORBIDDEN");

        let relocated = relocate_entity_error(
            error,
            &path(&["getCredential", "client"]),
            &path(&["getCredential", "client", "name"]),
            "Client",
            &[],
        );

        assert_eq!(relocated.path, Some(path(&["getCredential", "client", "name"])));
        assert_eq!(relocated.code(), Some("FORBIDDEN"));
    }

    #[test]
    fn root_errors_follow_their_field() {
        let first = FieldSelection {
            response_key: "a".to_string(),
            name: "a".to_string(),
            arguments: vec![],
            parent_type: QUERY_TYPE.to_string(),
            field_type: Type::NamedType("String".to_string()),
            selections: vec![],
        };
        let second = FieldSelection {
            response_key: "b".to_string(),
            name: "b".to_string(),
            ..first.clone()
        };

        let relocated = relocate_root_errors(
            vec![
                GraphQLError::from("on b").with_path(path(&["b"])),
                GraphQLError::from("nowhere"),
            ],
            &[&first, &second],
        );

        assert_eq!(
            serde_json::to_value(&relocated).unwrap(),
            json!([
                [{ "message": "nowhere", "path": ["a"], "extensions": { "code": "RESOLVER_ERROR" } }],
                [{ "message": "on b", "path": ["b"], "extensions": { "code": "RESOLVER_ERROR" } }]
            ])
        );
    }

    #[test]
    fn key_alias_errors_become_merge_key_missing_on_the_stub() {
        let credential = selection(
            "getCredential",
            QUERY_TYPE,
            "Credential",
            vec![selection("client", "Credential", "Client", vec![])],
        );
        let error = GraphQLError::from("internal: non-null types require a return value")
            .with_path(path(&["getCredential", "client", "_stitch_key__id"]));

        let relocated = relocate_root_errors(vec![error], &[&credential]);

        insta::assert_snapshot!(serde_json::to_string(&relocated).unwrap(), @r#"[[{"message":"Cannot merge \"Client\": key field \"_id\" is missing or null","path":["getCredential","client"],"extensions":{"code":"MERGE_KEY_MISSING"}}]]"#);
    }

    #[test]
    fn key_alias_errors_inside_entities_are_rebased_onto_the_nested_stub() {
        let owner = selection("owner", "Client", "Person", vec![]);
        let error = GraphQLError::from("internal: non-null types require a return value")
            .with_path(path(&["_entity", "owner", "_stitch_key_email"]));

        let relocated = relocate_entity_error(
            error,
            &path(&["getCredential", "client"]),
            &path(&["getCredential", "client", "owner"]),
            "Client",
            &[&owner],
        );

        assert_eq!(relocated.path, Some(path(&["getCredential", "client", "owner"])));
        assert_eq!(relocated.code(), Some("MERGE_KEY_MISSING"));
        assert_eq!(
            relocated.message,
            "Cannot merge \"Person\": key field \"email\" is missing or null"
        );
    }

    #[test]
    fn errors_follow_client_field_order() {
        let selections = vec![
            selection(
                "client",
                QUERY_TYPE,
                "Client",
                vec![
                    selection("tenantCode", "Client", "String", vec![]),
                    selection("label", "Client", "String", vec![]),
                ],
            ),
            selection("other", QUERY_TYPE, "String", vec![]),
        ];

        let mut orders = [
            client_order(None, &selections),
            client_order(Some(path(&["other"]).as_slice()), &selections),
            client_order(Some(path(&["client", "label"]).as_slice()), &selections),
            client_order(Some(path(&["client", "tenantCode"]).as_slice()), &selections),
        ];
        orders.sort();

        assert_eq!(orders, [vec![0, 0], vec![0, 1], vec![1], vec![usize::MAX]]);
    }
}
