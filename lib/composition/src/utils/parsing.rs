use graphql_parser::{
    query::{Definition, OperationDefinition, Selection},
    schema::{Document, Type},
};

use crate::error::CompositionError;

pub type SchemaDocument = Document<'static, String>;

#[inline]
pub fn parse_schema(subschema: &str, sdl: &str) -> Result<SchemaDocument, CompositionError> {
    graphql_parser::parse_schema::<String>(sdl)
        .map(|document| document.into_static())
        .map_err(|err| CompositionError::malformed(subschema, err.to_string()))
}

/// Parses a key selection such as `{ _id tenantCode }` into its field names, in order.
///
/// Only flat selections of fields are accepted.
pub fn parse_field_set(selection_set: &str) -> Result<Vec<String>, String> {
    let source = match selection_set.trim_start().starts_with('{') {
        true => selection_set.to_string(),
        false => format!("{{ {} }}", selection_set),
    };
    let document =
        graphql_parser::parse_query::<String>(&source).map_err(|err| err.to_string())?;

    let selection_set = match document.definitions.into_iter().next() {
        Some(Definition::Operation(OperationDefinition::SelectionSet(selection_set))) => {
            selection_set
        }
        _ => return Err(format!("\"{}\" is not a selection set", selection_set)),
    };

    let mut fields = Vec::with_capacity(selection_set.items.len());
    for selection in selection_set.items {
        match selection {
            Selection::Field(field)
                if field.alias.is_none()
                    && field.arguments.is_empty()
                    && field.selection_set.items.is_empty() =>
            {
                if !fields.contains(&field.name) {
                    fields.push(field.name);
                }
            }
            _ => {
                return Err(
                    "key selections may only contain plain fields without arguments or sub-selections"
                        .to_string(),
                )
            }
        }
    }

    if fields.is_empty() {
        return Err("key selection is empty".to_string());
    }

    Ok(fields)
}

/// Name of the query root type: the `schema { query: ... }` entry when present, `Query` otherwise.
pub fn query_type_name(document: &SchemaDocument) -> &str {
    document
        .definitions
        .iter()
        .find_map(|definition| match definition {
            graphql_parser::schema::Definition::SchemaDefinition(schema) => schema.query.as_deref(),
            _ => None,
        })
        .unwrap_or("Query")
}

/// The name at the core of a possibly wrapped type: `[Client!]!` gives `Client`.
pub fn named_type<'a>(field_type: &'a Type<'static, String>) -> &'a str {
    match field_type {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => named_type(inner),
    }
}
