use graphql_parser::schema::{Definition, ObjectType, TypeDefinition};
use tracing::{debug, instrument};

use crate::{
    directives::{KeyDirective, MergeDirective, StitchingDirective, STITCHING_DIRECTIVE_DEFINITIONS},
    error::CompositionError,
    utils::parsing::{named_type, parse_schema, query_type_name, SchemaDocument},
};

/// Declares an object type as an entity: the fields identifying it and, optionally, the query
/// root field re-fetching one instance by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityAnnotation {
    pub type_name: String,
    pub key_fields: Vec<String>,
    pub entry_field: Option<String>,
    /// `(key field, argument)` pairs where the argument name differs from the key field.
    pub argument_mapping: Vec<(String, String)>,
}

impl EntityAnnotation {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            key_fields: vec![],
            entry_field: None,
            argument_mapping: vec![],
        }
    }

    pub fn key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn entry_field(mut self, field_name: impl Into<String>) -> Self {
        self.entry_field = Some(field_name.into());
        self
    }

    /// Feeds `key_field` into the entry field argument `argument`.
    pub fn key_argument(mut self, key_field: impl Into<String>, argument: impl Into<String>) -> Self {
        let key_field = key_field.into();
        self.argument_mapping.retain(|(field, _)| *field != key_field);
        self.argument_mapping.push((key_field, argument.into()));
        self
    }

    fn argument_for<'a>(&'a self, key_field: &'a str) -> &'a str {
        self.argument_mapping
            .iter()
            .find(|(field, _)| field == key_field)
            .map(|(_, argument)| argument.as_str())
            .unwrap_or(key_field)
    }

    fn merge_directive(&self) -> MergeDirective {
        let remapped = self
            .key_fields
            .iter()
            .filter(|field| self.argument_for(field) != field.as_str())
            .count();

        match (remapped, self.key_fields.as_slice()) {
            (0, _) => MergeDirective::default(),
            (_, [only]) => MergeDirective {
                key_field: Some(only.clone()),
                key_arg: Some(self.argument_for(only).to_string()),
                args_expr: None,
            },
            _ => MergeDirective {
                args_expr: Some(
                    self.key_fields
                        .iter()
                        .map(|field| format!("{}: $key.{}", self.argument_for(field), field))
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                ..Default::default()
            },
        }
    }
}

/// Adds `@key` / `@merge` directives, and their definitions, to a subschema's type definitions.
///
/// The input must parse, every annotated type and entry field must exist and the entry field
/// must return the annotated type. Existing stitching directives on the same elements are
/// replaced.
#[instrument(level = "debug", skip(type_defs, annotations), fields(annotations = annotations.len()))]
pub fn annotate(
    subschema: &str,
    type_defs: &str,
    annotations: &[EntityAnnotation],
) -> Result<String, CompositionError> {
    let mut document = parse_schema(subschema, type_defs)?;
    let query_type = query_type_name(&document).to_string();

    for annotation in annotations {
        annotate_entity(subschema, &mut document, &query_type, annotation)?;
    }

    append_directive_definitions(subschema, &mut document)?;

    Ok(document.to_string())
}

fn annotate_entity(
    subschema: &str,
    document: &mut SchemaDocument,
    query_type: &str,
    annotation: &EntityAnnotation,
) -> Result<(), CompositionError> {
    let type_name = &annotation.type_name;
    if annotation.key_fields.is_empty() {
        return Err(CompositionError::malformed(
            subschema,
            format!("entity \"{}\" is annotated with an empty key", type_name),
        ));
    }

    let object = find_object_mut(document, type_name).ok_or_else(|| {
        CompositionError::malformed(
            subschema,
            format!("cannot annotate unknown object type \"{}\"", type_name),
        )
    })?;

    if let Some(missing) = annotation
        .key_fields
        .iter()
        .find(|key_field| !object.fields.iter().any(|field| field.name == **key_field))
    {
        return Err(CompositionError::malformed(
            subschema,
            format!("key field \"{}.{}\" is not declared", type_name, missing),
        ));
    }

    object.directives.retain(|directive| !KeyDirective::is(directive));
    object
        .directives
        .push(KeyDirective::new(annotation.key_fields.clone()).to_directive());
    debug!(type_name = %type_name, "added @key");

    let Some(entry_field) = &annotation.entry_field else {
        return Ok(());
    };

    let root = find_object_mut(document, query_type).ok_or_else(|| {
        CompositionError::malformed(
            subschema,
            format!("entry field \"{}\" needs a \"{}\" type", entry_field, query_type),
        )
    })?;
    let field = root
        .fields
        .iter_mut()
        .find(|field| field.name == *entry_field)
        .ok_or_else(|| {
            CompositionError::malformed(
                subschema,
                format!(
                    "cannot annotate unknown entry field \"{}.{}\"",
                    query_type, entry_field
                ),
            )
        })?;

    if named_type(&field.field_type) != type_name {
        return Err(CompositionError::malformed(
            subschema,
            format!(
                "entry field \"{}.{}\" returns \"{}\", expected \"{}\"",
                query_type, entry_field, field.field_type, type_name
            ),
        ));
    }

    for key_field in &annotation.key_fields {
        let argument = annotation.argument_for(key_field);
        if !field.arguments.iter().any(|arg| arg.name == argument) {
            return Err(CompositionError::malformed(
                subschema,
                format!(
                    "entry field \"{}.{}\" has no argument \"{}\" for key field \"{}\"",
                    query_type, entry_field, argument, key_field
                ),
            ));
        }
    }

    field
        .directives
        .retain(|directive| !MergeDirective::is(directive));
    field
        .directives
        .push(annotation.merge_directive().to_directive());
    debug!(type_name = %type_name, entry_field = %entry_field, "added @merge");

    Ok(())
}

fn find_object_mut<'a>(
    document: &'a mut SchemaDocument,
    type_name: &str,
) -> Option<&'a mut ObjectType<'static, String>> {
    document
        .definitions
        .iter_mut()
        .find_map(|definition| match definition {
            Definition::TypeDefinition(TypeDefinition::Object(object)) if object.name == type_name => {
                Some(object)
            }
            _ => None,
        })
}

fn append_directive_definitions(
    subschema: &str,
    document: &mut SchemaDocument,
) -> Result<(), CompositionError> {
    let definitions = parse_schema(subschema, STITCHING_DIRECTIVE_DEFINITIONS)?;

    for definition in definitions.definitions {
        let Definition::DirectiveDefinition(directive) = &definition else {
            continue;
        };
        let already_defined = document.definitions.iter().any(|existing| {
            matches!(existing, Definition::DirectiveDefinition(existing) if existing.name == directive.name)
        });
        if !already_defined {
            document.definitions.push(definition);
        }
    }

    Ok(())
}
