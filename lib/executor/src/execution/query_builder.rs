use std::fmt::Write;

use graphql_parser::schema::Type;
use hive_stitching_composition::{
    supergraph::subschema_state::SubschemaState, utils::parsing::named_type, Supergraph,
    QUERY_TYPE,
};
use serde_json::{Map, Value};

use crate::execution::operation::FieldSelection;

/// Alias under which the key fields of a stub are fetched.
pub const KEY_ALIAS_PREFIX: &str = "_stitch_key_";
/// Alias of the entry field in an entity sub-query.
pub const ENTITY_ALIAS: &str = "_entity";

pub fn key_alias(key_field: &str) -> String {
    format!("{}{}", KEY_ALIAS_PREFIX, key_field)
}

/// True when `subschema` cannot answer the field by itself.
pub fn is_remote(subschema: &SubschemaState, type_name: &str, selection: &FieldSelection) -> bool {
    !selection.is_typename() && !subschema.declares(type_name, &selection.name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubQuery {
    pub query: String,
    pub variables: Map<String, Value>,
}

/// Prints the part of a client selection one subschema can answer.
///
/// Argument values travel as variables typed with the subschema's own declarations.
pub struct QueryBuilder<'a> {
    supergraph: &'a Supergraph,
    subschema: &'a SubschemaState,
    variable_definitions: Vec<String>,
    variables: Map<String, Value>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(supergraph: &'a Supergraph, subschema: &'a SubschemaState) -> Self {
        Self {
            supergraph,
            subschema,
            variable_definitions: vec![],
            variables: Map::new(),
        }
    }

    /// `query { rootField(arg: $_v0) { ... } }`
    pub fn root(mut self, fields: &[&FieldSelection]) -> SubQuery {
        let mut body = String::new();
        for field in fields {
            self.write_field(QUERY_TYPE, field, &mut body);
        }

        self.finish(body)
    }

    /// `query { _entity: entryField(arg: $_v0) { ... } }`
    pub fn entity(
        mut self,
        entry_field: &str,
        arguments: &Map<String, Value>,
        type_name: &str,
        selections: &[&FieldSelection],
    ) -> SubQuery {
        let mut body = format!("{}: {}", ENTITY_ALIAS, entry_field);
        let declared_arguments = self
            .subschema
            .field(QUERY_TYPE, entry_field)
            .map(|field| field.arguments.as_slice())
            .unwrap_or_default();
        let mut printed_arguments = vec![];
        for argument in declared_arguments {
            if let Some(value) = arguments.get(&argument.name) {
                let variable = self.add_variable(value.clone(), &argument.value_type);
                printed_arguments.push(format!("{}: ${}", argument.name, variable));
            }
        }
        if !printed_arguments.is_empty() {
            let _ = write!(body, "({})", printed_arguments.join(", "));
        }

        let mut selection_set = String::new();
        for selection in selections {
            self.write_field(type_name, selection, &mut selection_set);
        }
        if selection_set.is_empty() {
            selection_set.push_str(" __typename");
        }
        let _ = write!(body, " {{{} }}", selection_set);

        self.finish(format!(" {}", body))
    }

    fn finish(self, body: String) -> SubQuery {
        let query = match self.variable_definitions.is_empty() {
            true => format!("query {{{} }}", body),
            false => format!(
                "query({}) {{{} }}",
                self.variable_definitions.join(", "),
                body
            ),
        };

        SubQuery {
            query,
            variables: self.variables,
        }
    }

    fn add_variable(&mut self, value: Value, variable_type: &Type<'static, String>) -> String {
        let name = format!("_v{}", self.variable_definitions.len());
        self.variable_definitions
            .push(format!("${}: {}", name, variable_type));
        self.variables.insert(name.clone(), value);
        name
    }

    /// Writes ` alias: name(args) { ... }` when the subschema declares the field.
    fn write_field(&mut self, parent_type: &str, selection: &FieldSelection, out: &mut String) {
        if selection.is_typename() {
            return;
        }
        let Some(definition) = self.subschema.field(parent_type, &selection.name) else {
            return;
        };

        out.push(' ');
        if selection.response_key != selection.name {
            let _ = write!(out, "{}: ", selection.response_key);
        }
        out.push_str(&selection.name);

        let mut printed_arguments = vec![];
        for (name, value) in &selection.arguments {
            let Some(argument) = definition.arguments.iter().find(|arg| arg.name == *name) else {
                continue;
            };
            let variable = self.add_variable(value.clone(), &argument.value_type);
            printed_arguments.push(format!("{}: ${}", name, variable));
        }
        if !printed_arguments.is_empty() {
            let _ = write!(out, "({})", printed_arguments.join(", "));
        }

        let field_type = named_type(&definition.field_type);
        if self.supergraph.is_leaf_type(field_type) {
            return;
        }

        let mut selection_set = String::new();
        for nested in &selection.selections {
            self.write_field(field_type, nested, &mut selection_set);
        }

        if let Some(config) = self.supergraph.merge_config(field_type) {
            let has_remote_fields = selection
                .selections
                .iter()
                .any(|nested| is_remote(self.subschema, field_type, nested));
            if has_remote_fields {
                for key_field in &config.required_selection {
                    if self.subschema.declares(field_type, key_field) {
                        let _ = write!(selection_set, " {}: {}", key_alias(key_field), key_field);
                    }
                }
            }
        }

        if selection_set.is_empty() {
            selection_set.push_str(" __typename");
        }
        let _ = write!(out, " {{{} }}", selection_set);
    }
}
