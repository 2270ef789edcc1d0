mod compose;
pub mod merge_config;
pub mod subschema_state;

pub use compose::compose;

use std::{collections::HashMap, fmt};

use graphql_parser::schema::{
    Definition, EnumType, Field, InputObjectType, ObjectType, ScalarType, TypeDefinition,
};
use indexmap::IndexMap;

use crate::{
    subschema::resolver::FieldCoordinate,
    supergraph::{merge_config::MergeConfig, subschema_state::SubschemaState},
    utils::parsing::SchemaDocument,
};

/// Name of the supergraph query root, whatever the subschemas call theirs.
pub const QUERY_TYPE: &str = "Query";

static BUILT_IN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

#[derive(Debug, Clone)]
pub struct SupergraphObject {
    pub name: String,
    pub description: Option<String>,
    /// Merged fields, stitching directives removed.
    pub fields: IndexMap<String, Field<'static, String>>,
    /// Subschemas declaring the type, in composition order.
    pub subschemas: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum SupergraphDefinition {
    Object(SupergraphObject),
    Scalar(ScalarType<'static, String>),
    Enum(EnumType<'static, String>),
    InputObject(InputObjectType<'static, String>),
}

impl SupergraphDefinition {
    pub fn kind(&self) -> &'static str {
        match self {
            SupergraphDefinition::Object(_) => "object",
            SupergraphDefinition::Scalar(_) => "scalar",
            SupergraphDefinition::Enum(_) => "enum",
            SupergraphDefinition::InputObject(_) => "input object",
        }
    }

    fn to_definition(&self) -> Definition<'static, String> {
        let type_definition = match self {
            SupergraphDefinition::Object(object) => {
                let mut definition = ObjectType::new(object.name.clone());
                definition.description = object.description.clone();
                definition.fields = object.fields.values().cloned().collect();
                TypeDefinition::Object(definition)
            }
            SupergraphDefinition::Scalar(scalar) => TypeDefinition::Scalar(scalar.clone()),
            SupergraphDefinition::Enum(enum_type) => TypeDefinition::Enum(enum_type.clone()),
            SupergraphDefinition::InputObject(input) => TypeDefinition::InputObject(input.clone()),
        };

        Definition::TypeDefinition(type_definition)
    }
}

/// A note left by composition about a tie it broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionWarning {
    pub coordinate: String,
    pub message: String,
}

impl fmt::Display for CompositionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.coordinate, self.message)
    }
}

/// The composed schema: merged type system, field ownership and entity merge configuration.
///
/// Read-only once built, share it behind an `Arc`.
#[derive(Debug)]
pub struct Supergraph {
    definitions: IndexMap<String, SupergraphDefinition>,
    /// Owning subschema of every field.
    dispatch: HashMap<FieldCoordinate, String>,
    merge_configs: HashMap<String, MergeConfig>,
    subschemas: IndexMap<String, SubschemaState>,
    warnings: Vec<CompositionWarning>,
}

impl Supergraph {
    pub fn definition(&self, type_name: &str) -> Option<&SupergraphDefinition> {
        self.definitions.get(type_name)
    }

    pub fn object(&self, type_name: &str) -> Option<&SupergraphObject> {
        match self.definitions.get(type_name) {
            Some(SupergraphDefinition::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&Field<'static, String>> {
        self.object(type_name)
            .and_then(|object| object.fields.get(field_name))
    }

    pub fn is_leaf_type(&self, type_name: &str) -> bool {
        BUILT_IN_SCALARS.contains(&type_name)
            || matches!(
                self.definitions.get(type_name),
                Some(SupergraphDefinition::Scalar(_)) | Some(SupergraphDefinition::Enum(_))
            )
    }

    /// The subschema a field is delegated to.
    pub fn owner(&self, type_name: &str, field_name: &str) -> Option<&str> {
        self.dispatch
            .get(&FieldCoordinate::new(type_name, field_name))
            .map(String::as_str)
    }

    pub fn merge_config(&self, type_name: &str) -> Option<&MergeConfig> {
        self.merge_configs.get(type_name)
    }

    pub fn merge_configs(&self) -> impl Iterator<Item = &MergeConfig> {
        self.merge_configs.values()
    }

    pub fn subschema(&self, name: &str) -> Option<&SubschemaState> {
        self.subschemas.get(name)
    }

    pub fn subschema_names(&self) -> impl Iterator<Item = &str> {
        self.subschemas.keys().map(String::as_str)
    }

    pub fn warnings(&self) -> &[CompositionWarning] {
        &self.warnings
    }

    pub fn document(&self) -> SchemaDocument {
        SchemaDocument {
            definitions: self
                .definitions
                .values()
                .map(SupergraphDefinition::to_definition)
                .collect(),
        }
    }

    /// The merged type system as SDL, without stitching directives.
    pub fn sdl(&self) -> String {
        self.document().to_string()
    }
}
