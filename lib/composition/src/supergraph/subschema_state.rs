use std::collections::{HashMap, HashSet};

use graphql_parser::schema::{Definition, Field, TypeDefinition};
use indexmap::IndexMap;

use crate::{
    directives::{KeyDirective, MergeDirective, StitchingDirective},
    error::CompositionError,
    subschema::Subschema,
    supergraph::QUERY_TYPE,
};

/// What a single subschema declares, expressed with supergraph type names: the subschema's
/// query root is always recorded as `Query`.
#[derive(Debug, Clone)]
pub struct SubschemaState {
    pub name: String,
    /// Declared fields of every object type.
    objects: HashMap<String, IndexMap<String, Field<'static, String>>>,
    /// Entity keys from `@key`.
    pub keys: IndexMap<String, Vec<String>>,
    /// Root fields carrying `@merge`.
    pub entry_fields: IndexMap<String, MergeDirective>,
    /// Root fields with a registered resolver.
    pub resolved_root_fields: HashSet<String>,
}

impl SubschemaState {
    pub fn new(subschema: &Subschema) -> Result<Self, CompositionError> {
        let name = subschema.name();
        let query_type = subschema.query_type();
        let mut state = Self {
            name: name.to_string(),
            objects: HashMap::new(),
            keys: IndexMap::new(),
            entry_fields: IndexMap::new(),
            resolved_root_fields: HashSet::new(),
        };

        for definition in &subschema.document().definitions {
            let Definition::TypeDefinition(TypeDefinition::Object(object)) = definition else {
                continue;
            };
            let is_root = object.name == query_type;
            let type_name = match is_root {
                true => QUERY_TYPE.to_string(),
                false => object.name.clone(),
            };

            if let Some(key) = KeyDirective::find(&object.directives).map_err(|reason| {
                CompositionError::malformed(name, format!("@key on \"{}\": {}", type_name, reason))
            })? {
                state.keys.insert(type_name.clone(), key.fields);
            }

            let mut fields = IndexMap::with_capacity(object.fields.len());
            for field in &object.fields {
                let merge = MergeDirective::find(&field.directives).map_err(|reason| {
                    CompositionError::malformed(
                        name,
                        format!("@merge on \"{}.{}\": {}", type_name, field.name, reason),
                    )
                })?;

                match (merge, is_root) {
                    (Some(merge), true) => {
                        state.entry_fields.insert(field.name.clone(), merge);
                    }
                    (Some(_), false) => {
                        return Err(CompositionError::malformed(
                            name,
                            format!(
                                "@merge on \"{}.{}\" is only allowed on query root fields",
                                type_name, field.name
                            ),
                        ))
                    }
                    (None, _) => {}
                }

                if is_root && subschema.resolvers().contains(query_type, &field.name) {
                    state.resolved_root_fields.insert(field.name.clone());
                }

                fields.insert(field.name.clone(), field.clone());
            }

            state.objects.insert(type_name, fields);
        }

        Ok(state)
    }

    pub fn declares(&self, type_name: &str, field_name: &str) -> bool {
        self.field(type_name, field_name).is_some()
    }

    pub fn declares_type(&self, type_name: &str) -> bool {
        self.objects.contains_key(type_name)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&Field<'static, String>> {
        self.objects
            .get(type_name)
            .and_then(|fields| fields.get(field_name))
    }

    pub fn field_names(&self, type_name: &str) -> Vec<&str> {
        self.objects
            .get(type_name)
            .map(|fields| fields.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
