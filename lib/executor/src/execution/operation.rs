//! Turns the client document into a tree of field selections resolved against the supergraph:
//! the operation is selected, variables are coerced, fragments are flattened, `@skip` and
//! `@include` are applied and fields are merged by response key.

use std::collections::{HashMap, HashSet};

use graphql_parser::{
    query::{
        parse_query, Definition, Directive, Document, Field, FragmentDefinition,
        OperationDefinition, Selection, SelectionSet, TypeCondition, VariableDefinition,
    },
    schema::Type,
};
use hive_stitching_composition::{utils::parsing::named_type, Supergraph, QUERY_TYPE};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{execution::error::RequestError, utils::value::to_json};

pub const TYPENAME_FIELD: &str = "__typename";

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    pub response_key: String,
    pub name: String,
    /// Coerced argument values, in declaration order.
    pub arguments: Vec<(String, Value)>,
    pub parent_type: String,
    /// Declared type in the supergraph.
    pub field_type: Type<'static, String>,
    pub selections: Vec<FieldSelection>,
}

impl FieldSelection {
    pub fn is_typename(&self) -> bool {
        self.name == TYPENAME_FIELD
    }

    pub fn coordinate(&self) -> String {
        format!("{}.{}", self.parent_type, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedOperation {
    pub name: Option<String>,
    pub selections: Vec<FieldSelection>,
}

pub fn normalize_operation(
    supergraph: &Supergraph,
    query: &str,
    operation_name: Option<&str>,
    variables: &Map<String, Value>,
) -> Result<NormalizedOperation, RequestError> {
    let document: Document<'static, String> = parse_query::<String>(query)
        .map_err(|e| RequestError::Parse(e.to_string()))?
        .into_static();

    let mut operations = vec![];
    let mut fragments = HashMap::new();
    for definition in &document.definitions {
        match definition {
            Definition::Operation(operation) => operations.push(operation),
            Definition::Fragment(fragment) => {
                fragments.insert(fragment.name.as_str(), fragment);
            }
        }
    }

    let operation = select_operation(&operations, operation_name)?;
    let (name, variable_definitions, directives, selection_set): (
        Option<String>,
        &[VariableDefinition<'static, String>],
        &[Directive<'static, String>],
        &SelectionSet<'static, String>,
    ) = match operation {
        OperationDefinition::SelectionSet(selection_set) => (None, &[], &[], selection_set),
        OperationDefinition::Query(query) => (
            query.name.clone(),
            query.variable_definitions.as_slice(),
            query.directives.as_slice(),
            &query.selection_set,
        ),
        OperationDefinition::Mutation(_) => {
            return Err(RequestError::UnsupportedOperation("mutation"))
        }
        OperationDefinition::Subscription(_) => {
            return Err(RequestError::UnsupportedOperation("subscription"))
        }
    };

    let normalizer = Normalizer {
        supergraph,
        fragments,
        variables: coerce_variables(variable_definitions, variables)?,
    };

    let selections = match normalizer.should_include(directives)? {
        true => normalizer.build_selections(QUERY_TYPE, &[selection_set])?,
        false => vec![],
    };

    Ok(NormalizedOperation { name, selections })
}

fn select_operation<'d>(
    operations: &[&'d OperationDefinition<'static, String>],
    operation_name: Option<&str>,
) -> Result<&'d OperationDefinition<'static, String>, RequestError> {
    match operation_name {
        Some(wanted) => operations
            .iter()
            .find(|operation| operation_name_of(operation) == Some(wanted))
            .copied()
            .ok_or_else(|| RequestError::UnknownOperation(wanted.to_string())),
        None => match operations {
            [] => Err(RequestError::NoOperation),
            [operation] => Ok(*operation),
            _ => Err(RequestError::AmbiguousOperation),
        },
    }
}

fn operation_name_of<'d>(operation: &'d OperationDefinition<'static, String>) -> Option<&'d str> {
    match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(query) => query.name.as_deref(),
        OperationDefinition::Mutation(mutation) => mutation.name.as_deref(),
        OperationDefinition::Subscription(subscription) => subscription.name.as_deref(),
    }
}

/// Applies defaults and rejects missing required variables.
fn coerce_variables(
    definitions: &[VariableDefinition<'static, String>],
    provided: &Map<String, Value>,
) -> Result<Map<String, Value>, RequestError> {
    let mut coerced = Map::new();

    for definition in definitions {
        match (provided.get(&definition.name), &definition.default_value) {
            (Some(value), _) if !value.is_null() => {
                coerced.insert(definition.name.clone(), value.clone());
            }
            (None, Some(default_value)) => {
                coerced.insert(
                    definition.name.clone(),
                    to_json(default_value, &Map::new()),
                );
            }
            (provided_value, _) => {
                if matches!(definition.var_type, Type::NonNullType(_)) {
                    return Err(RequestError::MissingVariable {
                        name: definition.name.clone(),
                        variable_type: definition.var_type.to_string(),
                    });
                }
                if provided_value.is_some() {
                    coerced.insert(definition.name.clone(), Value::Null);
                }
            }
        }
    }

    Ok(coerced)
}

struct Normalizer<'d, 's> {
    supergraph: &'s Supergraph,
    fragments: HashMap<&'d str, &'d FragmentDefinition<'static, String>>,
    variables: Map<String, Value>,
}

impl<'d> Normalizer<'d, '_> {
    fn should_include(&self, directives: &[Directive<'static, String>]) -> Result<bool, RequestError> {
        for directive in directives {
            let expected = match directive.name.as_str() {
                "skip" => false,
                "include" => true,
                _ => continue,
            };
            let condition = directive
                .arguments
                .iter()
                .find(|(name, _)| name == "if")
                .map(|(_, value)| to_json(value, &self.variables))
                .and_then(|value| value.as_bool())
                .unwrap_or(false);

            if condition != expected {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn collect_fields(
        &self,
        type_name: &str,
        selection_set: &'d SelectionSet<'static, String>,
        visited_fragments: &mut HashSet<&'d str>,
        grouped: &mut IndexMap<String, Vec<&'d Field<'static, String>>>,
    ) -> Result<(), RequestError> {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => {
                    if !self.should_include(&field.directives)? {
                        continue;
                    }
                    let response_key = field.alias.as_ref().unwrap_or(&field.name);
                    grouped
                        .entry(response_key.clone())
                        .or_default()
                        .push(field);
                }
                Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.directives)? {
                        continue;
                    }
                    let fragment = self
                        .fragments
                        .get(spread.fragment_name.as_str())
                        .copied()
                        .ok_or_else(|| RequestError::UnknownFragment(spread.fragment_name.clone()))?;
                    if !visited_fragments.insert(fragment.name.as_str()) {
                        continue;
                    }
                    if applies_to(&fragment.type_condition, type_name) {
                        self.collect_fields(
                            type_name,
                            &fragment.selection_set,
                            visited_fragments,
                            grouped,
                        )?;
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.directives)? {
                        continue;
                    }
                    let applies = inline
                        .type_condition
                        .as_ref()
                        .is_none_or(|condition| applies_to(condition, type_name));
                    if applies {
                        self.collect_fields(
                            type_name,
                            &inline.selection_set,
                            visited_fragments,
                            grouped,
                        )?;
                    }
                }
            }
        }

        Ok(())
    }

    fn build_selections(
        &self,
        type_name: &str,
        selection_sets: &[&'d SelectionSet<'static, String>],
    ) -> Result<Vec<FieldSelection>, RequestError> {
        let mut grouped = IndexMap::new();
        let mut visited_fragments = HashSet::new();
        for selection_set in selection_sets {
            self.collect_fields(type_name, selection_set, &mut visited_fragments, &mut grouped)?;
        }

        grouped
            .into_iter()
            .map(|(response_key, fields)| self.build_field(type_name, response_key, &fields))
            .collect()
    }

    fn build_field(
        &self,
        parent_type: &str,
        response_key: String,
        fields: &[&'d Field<'static, String>],
    ) -> Result<FieldSelection, RequestError> {
        let field = fields[0];
        let coordinate = format!("{}.{}", parent_type, field.name);
        let has_selection = fields
            .iter()
            .any(|field| !field.selection_set.items.is_empty());

        if field.name == TYPENAME_FIELD {
            if has_selection {
                return Err(RequestError::SelectionMismatch {
                    coordinate,
                    reason: "is a leaf and must not have a selection".to_string(),
                });
            }
            return Ok(FieldSelection {
                response_key,
                name: field.name.clone(),
                arguments: vec![],
                parent_type: parent_type.to_string(),
                field_type: Type::NonNullType(Box::new(Type::NamedType("String".to_string()))),
                selections: vec![],
            });
        }

        let definition = self.supergraph.field(parent_type, &field.name).ok_or_else(|| {
            RequestError::UnknownField {
                type_name: parent_type.to_string(),
                field_name: field.name.clone(),
            }
        })?;

        let mut arguments = Vec::with_capacity(definition.arguments.len());
        for (name, _) in &field.arguments {
            if !definition.arguments.iter().any(|argument| argument.name == *name) {
                return Err(RequestError::UnknownArgument {
                    coordinate,
                    argument: name.clone(),
                });
            }
        }
        for argument in &definition.arguments {
            let provided = field
                .arguments
                .iter()
                .find(|(name, _)| *name == argument.name)
                .map(|(_, value)| value)
                .filter(|value| match value {
                    graphql_parser::query::Value::Variable(variable) => {
                        self.variables.contains_key(variable)
                    }
                    _ => true,
                });

            match (provided, &argument.default_value) {
                (Some(value), _) => {
                    arguments.push((argument.name.clone(), to_json(value, &self.variables)))
                }
                (None, Some(default_value)) => arguments.push((
                    argument.name.clone(),
                    to_json(default_value, &Map::new()),
                )),
                (None, None) if matches!(argument.value_type, Type::NonNullType(_)) => {
                    return Err(RequestError::MissingArgument {
                        coordinate,
                        argument: argument.name.clone(),
                        argument_type: argument.value_type.to_string(),
                    })
                }
                (None, None) => {}
            }
        }

        let field_type_name = named_type(&definition.field_type);
        let is_leaf = self.supergraph.is_leaf_type(field_type_name);
        let selections = match (is_leaf, has_selection) {
            (true, true) => {
                return Err(RequestError::SelectionMismatch {
                    coordinate,
                    reason: format!(
                        "of type \"{}\" is a leaf and must not have a selection",
                        definition.field_type
                    ),
                })
            }
            (false, false) => {
                return Err(RequestError::SelectionMismatch {
                    coordinate,
                    reason: format!(
                        "of type \"{}\" must have a selection of subfields",
                        definition.field_type
                    ),
                })
            }
            (true, false) => vec![],
            (false, true) => {
                let selection_sets = fields
                    .iter()
                    .map(|field| &field.selection_set)
                    .collect::<Vec<_>>();
                self.build_selections(field_type_name, &selection_sets)?
            }
        };

        Ok(FieldSelection {
            response_key,
            name: field.name.clone(),
            arguments,
            parent_type: parent_type.to_string(),
            field_type: definition.field_type.clone(),
            selections,
        })
    }
}

fn applies_to(condition: &TypeCondition<'static, String>, type_name: &str) -> bool {
    match condition {
        TypeCondition::On(condition_type) => condition_type == type_name,
    }
}

#[cfg(test)]
mod tests {
    use hive_stitching_composition::{compose, Subschema};
    use serde_json::json;

    use super::*;

    fn supergraph() -> Supergraph {
        compose(&[Subschema::new(
            "library",
            r#"
type Query {
  book(id: ID!, format: String = "paperback"): Book
  books: [Book]
}
type Book { id: ID! title: String author: Author }
type Author { name: String }
"#,
            Default::default(),
        )
        .unwrap()])
        .unwrap()
    }

    fn keys(selections: &[FieldSelection]) -> Vec<&str> {
        selections
            .iter()
            .map(|selection| selection.response_key.as_str())
            .collect()
    }

    #[test]
    fn flattens_fragments_and_merges_fields() {
        let supergraph = supergraph();
        let operation = normalize_operation(
            &supergraph,
            r#"
query Books($id: ID!) {
  book(id: $id) { id ...BookFields ... on Book { author { name } } }
  ...QueryFields
}
fragment BookFields on Book { title author { __typename } }
fragment QueryFields on Query { all: books { id } }
"#,
            Some("Books"),
            json!({ "id": "b1" }).as_object().unwrap(),
        )
        .unwrap();

        assert_eq!(operation.name.as_deref(), Some("Books"));
        assert_eq!(keys(&operation.selections), vec!["book", "all"]);

        let book = &operation.selections[0];
        assert_eq!(
            book.arguments,
            vec![
                ("id".to_string(), json!("b1")),
                ("format".to_string(), json!("paperback"))
            ]
        );
        assert_eq!(keys(&book.selections), vec!["id", "title", "author"]);
        assert_eq!(keys(&book.selections[2].selections), vec!["__typename", "name"]);
    }

    #[test]
    fn honours_skip_and_include() {
        let supergraph = supergraph();
        let operation = normalize_operation(
            &supergraph,
            r#"query($withTitle: Boolean!) { books { id @skip(if: true) title @include(if: $withTitle) author @include(if: false) { name } } }"#,
            None,
            json!({ "withTitle": true }).as_object().unwrap(),
        )
        .unwrap();

        assert_eq!(keys(&operation.selections[0].selections), vec!["title"]);
    }

    #[test]
    fn request_errors() {
        let supergraph = supergraph();
        let no_variables = Map::new();
        let error = |query: &str, operation_name: Option<&str>| {
            normalize_operation(&supergraph, query, operation_name, &no_variables)
                .unwrap_err()
                .to_string()
        };

        insta::assert_snapshot!(error("{ nope }", None), @r#"Cannot query field "nope" on type "Query""#);
        insta::assert_snapshot!(error("{ books }", None), @r#"Field "Query.books" of type "[Book]" must have a selection of subfields"#);
        insta::assert_snapshot!(error("{ books { id { x } } }", None), @r#"Field "Book.id" of type "ID!" is a leaf and must not have a selection"#);
        insta::assert_snapshot!(error("mutation { books { id } }", None), @"mutation operations are not supported, only queries can be stitched");
        insta::assert_snapshot!(error("query A { books { id } } query B { books { id } }", None), @"The document contains several operations, an operation name is required");
        insta::assert_snapshot!(error("query A { books { id } }", Some("C")), @r#"Unknown operation named "C""#);
        insta::assert_snapshot!(error("query($id: ID!) { book(id: $id) { id } }", None), @r#"Variable "$id" of required type "ID!" was not provided"#);
        insta::assert_snapshot!(error("{ book { id } }", None), @r#"Field "Query.book" argument "id" of type "ID!" is required but not provided"#);
        insta::assert_snapshot!(error(r#"{ book(id: "1", color: "red") { id } }"#, None), @r#"Unknown argument "color" on field "Query.book""#);
        insta::assert_snapshot!(error("{ ...Missing }", None), @r#"Unknown fragment "Missing""#);
    }

    #[test]
    fn recursive_fragments_terminate() {
        let supergraph = supergraph();
        let operation = normalize_operation(
            &supergraph,
            "{ books { ...A } } fragment A on Book { id ...A }",
            None,
            &Map::new(),
        )
        .unwrap();

        assert_eq!(keys(&operation.selections[0].selections), vec!["id"]);
    }
}
