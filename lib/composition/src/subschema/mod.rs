pub mod resolver;

use std::{future::Future, sync::Arc};

use graphql_parser::schema::{Definition, ObjectType, TypeDefinition, TypeExtension};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    annotator::{annotate, EntityAnnotation},
    error::CompositionError,
    subschema::resolver::{ResolverError, ResolverMap, ResolverParams},
    utils::parsing::{parse_schema, query_type_name, SchemaDocument},
};

/// A type system paired with the resolvers that serve it.
///
/// Immutable once built. Clones share the resolver functions.
#[derive(Debug, Clone)]
pub struct Subschema {
    name: Arc<str>,
    document: SchemaDocument,
    resolvers: ResolverMap,
}

impl Subschema {
    /// Builds a subschema from already annotated type definitions.
    #[instrument(level = "debug", skip(sdl, resolvers))]
    pub fn new(name: &str, sdl: &str, resolvers: ResolverMap) -> Result<Self, CompositionError> {
        let document = parse_schema(name, sdl)?;
        let document = fold_object_extensions(name, document)?;

        for definition in &document.definitions {
            if let Definition::TypeDefinition(type_definition) = definition {
                match type_definition {
                    TypeDefinition::Interface(interface) => {
                        return Err(unsupported(name, "interface", &interface.name))
                    }
                    TypeDefinition::Union(union) => {
                        return Err(unsupported(name, "union", &union.name))
                    }
                    TypeDefinition::Object(object) if !object.implements_interfaces.is_empty() => {
                        return Err(unsupported(name, "interface implementation", &object.name))
                    }
                    _ => {}
                }
            }
        }

        let subschema = Self {
            name: name.into(),
            document,
            resolvers,
        };

        if !subschema.document.definitions.iter().any(|definition| {
            matches!(definition, Definition::TypeDefinition(TypeDefinition::Object(object)) if object.name == subschema.query_type())
        }) {
            return Err(CompositionError::malformed(
                name,
                format!("query root type \"{}\" is not defined", subschema.query_type()),
            ));
        }

        debug!(subschema = name, definitions = subschema.document.definitions.len(), "subschema ready");

        Ok(subschema)
    }

    pub fn builder(name: impl Into<String>, type_defs: impl Into<String>) -> SubschemaBuilder {
        SubschemaBuilder {
            name: name.into(),
            type_defs: type_defs.into(),
            annotations: vec![],
            resolvers: ResolverMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    pub fn resolvers(&self) -> &ResolverMap {
        &self.resolvers
    }

    pub fn query_type(&self) -> &str {
        query_type_name(&self.document)
    }

    /// The annotated type definitions, printed.
    pub fn sdl(&self) -> String {
        self.document.to_string()
    }

    pub fn object(&self, type_name: &str) -> Option<&ObjectType<'static, String>> {
        self.document
            .definitions
            .iter()
            .find_map(|definition| match definition {
                Definition::TypeDefinition(TypeDefinition::Object(object))
                    if object.name == type_name =>
                {
                    Some(object)
                }
                _ => None,
            })
    }
}

fn unsupported(subschema: &str, kind: &str, type_name: &str) -> CompositionError {
    CompositionError::malformed(
        subschema,
        format!("{} \"{}\" is not supported, only object types can be stitched", kind, type_name),
    )
}

/// Moves the fields of `extend type X` into the definition of `X`.
fn fold_object_extensions(
    subschema: &str,
    document: SchemaDocument,
) -> Result<SchemaDocument, CompositionError> {
    let mut definitions: Vec<Definition<'static, String>> =
        Vec::with_capacity(document.definitions.len());
    let mut extensions = vec![];

    for definition in document.definitions {
        match definition {
            Definition::TypeExtension(TypeExtension::Object(extension)) => {
                extensions.push(extension)
            }
            Definition::TypeExtension(other) => {
                let name = match &other {
                    TypeExtension::Scalar(extension) => &extension.name,
                    TypeExtension::Interface(extension) => &extension.name,
                    TypeExtension::Union(extension) => &extension.name,
                    TypeExtension::Enum(extension) => &extension.name,
                    TypeExtension::InputObject(extension) => &extension.name,
                    TypeExtension::Object(extension) => &extension.name,
                };
                return Err(CompositionError::malformed(
                    subschema,
                    format!("only object types can be extended, \"{}\" cannot", name),
                ));
            }
            other => definitions.push(other),
        }
    }

    for extension in extensions {
        let existing = definitions.iter_mut().find_map(|definition| match definition {
            Definition::TypeDefinition(TypeDefinition::Object(object))
                if object.name == extension.name =>
            {
                Some(object)
            }
            _ => None,
        });

        match existing {
            Some(object) => {
                object.directives.extend(extension.directives);
                object.fields.extend(extension.fields);
            }
            None => {
                let mut object = ObjectType::new(extension.name);
                object.directives = extension.directives;
                object.fields = extension.fields;
                definitions.push(Definition::TypeDefinition(TypeDefinition::Object(object)));
            }
        }
    }

    Ok(SchemaDocument { definitions })
}

/// Collects entity annotations and resolvers before producing a [`Subschema`].
pub struct SubschemaBuilder {
    name: String,
    type_defs: String,
    annotations: Vec<EntityAnnotation>,
    resolvers: ResolverMap,
}

impl SubschemaBuilder {
    pub fn entity(mut self, annotation: EntityAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn resolver<F, Fut>(mut self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: Fn(ResolverParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ResolverError>> + Send + 'static,
    {
        self.resolvers.insert(type_name, field_name, resolver);
        self
    }

    pub fn sync_resolver<F>(mut self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: Fn(ResolverParams) -> Result<Value, ResolverError> + Send + Sync + 'static,
    {
        self.resolvers.insert_sync(type_name, field_name, resolver);
        self
    }

    pub fn build(self) -> Result<Subschema, CompositionError> {
        let annotated = match self.annotations.is_empty() {
            true => self.type_defs,
            false => annotate(&self.name, &self.type_defs, &self.annotations)?,
        };

        Subschema::new(&self.name, &annotated, self.resolvers)
    }
}
