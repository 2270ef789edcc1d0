use std::collections::{HashMap, HashSet};

use graphql_parser::schema::{Field, InputValue, Type, TypeDefinition};
use indexmap::IndexMap;
use tracing::{info, instrument, warn};

use crate::{
    directives::is_stitching_directive,
    error::CompositionError,
    subschema::{resolver::FieldCoordinate, Subschema},
    supergraph::{
        merge_config::{ArgsFromKey, MergeConfig},
        subschema_state::SubschemaState,
        CompositionWarning, Supergraph, SupergraphDefinition, SupergraphObject, QUERY_TYPE,
    },
    utils::parsing::named_type,
};

/// Merges annotated subschemas, in order, into a [`Supergraph`].
///
/// Object fields declared by several subschemas are taken from the last one, with a warning.
/// A root field declared twice is only allowed when one of the declarations is a `@merge`
/// entry field.
#[instrument(level = "info", skip_all, fields(subschemas = subschemas.len()))]
pub fn compose(subschemas: &[Subschema]) -> Result<Supergraph, CompositionError> {
    let mut builder = SupergraphBuilder::default();

    for subschema in subschemas {
        builder.add_subschema(subschema)?;
    }

    builder.finish()
}

#[derive(Default)]
struct SupergraphBuilder {
    definitions: IndexMap<String, SupergraphDefinition>,
    /// First subschema declaring each type, for kind conflicts.
    declared_by: HashMap<String, String>,
    dispatch: HashMap<FieldCoordinate, String>,
    subschemas: IndexMap<String, SubschemaState>,
    warnings: Vec<CompositionWarning>,
}

impl SupergraphBuilder {
    fn warn(&mut self, coordinate: impl ToString, message: String) {
        let warning = CompositionWarning {
            coordinate: coordinate.to_string(),
            message,
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn add_subschema(&mut self, subschema: &Subschema) -> Result<(), CompositionError> {
        let name = subschema.name();
        if self.subschemas.contains_key(name) {
            return Err(CompositionError::DuplicateSubschema(name.to_string()));
        }

        let state = SubschemaState::new(subschema)?;
        let query_type = subschema.query_type();

        for definition in &subschema.document().definitions {
            if let graphql_parser::schema::Definition::TypeDefinition(type_definition) = definition
            {
                self.merge_type_definition(&state, query_type, type_definition)?;
            }
        }

        self.subschemas.insert(name.to_string(), state);

        Ok(())
    }

    fn merge_type_definition(
        &mut self,
        state: &SubschemaState,
        query_type: &str,
        type_definition: &TypeDefinition<'static, String>,
    ) -> Result<(), CompositionError> {
        let incoming = match type_definition {
            TypeDefinition::Object(object) => {
                let name = match object.name == query_type {
                    true => QUERY_TYPE.to_string(),
                    false => object.name.clone(),
                };
                SupergraphDefinition::Object(SupergraphObject {
                    name,
                    description: object.description.clone(),
                    fields: IndexMap::new(),
                    subschemas: vec![],
                })
            }
            TypeDefinition::Scalar(scalar) => SupergraphDefinition::Scalar(scalar.clone()),
            TypeDefinition::Enum(enum_type) => SupergraphDefinition::Enum(enum_type.clone()),
            TypeDefinition::InputObject(input) => SupergraphDefinition::InputObject(input.clone()),
            TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
                return Err(CompositionError::malformed(
                    &state.name,
                    "abstract types cannot be stitched",
                ))
            }
        };
        let type_name = match &incoming {
            SupergraphDefinition::Object(object) => object.name.clone(),
            SupergraphDefinition::Scalar(scalar) => scalar.name.clone(),
            SupergraphDefinition::Enum(enum_type) => enum_type.name.clone(),
            SupergraphDefinition::InputObject(input) => input.name.clone(),
        };

        if let Some(existing) = self.definitions.get(&type_name) {
            if existing.kind() != incoming.kind() {
                return Err(CompositionError::CompositionConflict {
                    coordinate: type_name.clone(),
                    first: self.declared_by.get(&type_name).cloned().unwrap_or_default(),
                    second: state.name.clone(),
                    reason: format!("declared as {} and as {}", existing.kind(), incoming.kind()),
                });
            }
        } else {
            self.declared_by
                .insert(type_name.clone(), state.name.clone());
            self.definitions.insert(type_name.clone(), incoming);
        }

        match type_definition {
            TypeDefinition::Object(object) => {
                if let Some(SupergraphDefinition::Object(target)) =
                    self.definitions.get_mut(&type_name)
                {
                    target.subschemas.push(state.name.clone());
                    if target.description.is_none() {
                        target.description = object.description.clone();
                    }
                }
                for field in &object.fields {
                    self.merge_field(state, &type_name, field)?;
                }
            }
            TypeDefinition::Enum(enum_type) => {
                if let Some(SupergraphDefinition::Enum(target)) =
                    self.definitions.get_mut(&type_name)
                {
                    for value in &enum_type.values {
                        if !target.values.iter().any(|known| known.name == value.name) {
                            target.values.push(value.clone());
                        }
                    }
                }
            }
            TypeDefinition::InputObject(input) => {
                let mut redeclared = vec![];
                if let Some(SupergraphDefinition::InputObject(target)) =
                    self.definitions.get_mut(&type_name)
                {
                    for field in &input.fields {
                        match target.fields.iter_mut().find(|known| known.name == field.name) {
                            Some(known) => {
                                if input_value_signature(known) != input_value_signature(field) {
                                    redeclared.push(field.name.clone());
                                }
                                *known = field.clone();
                            }
                            None => target.fields.push(field.clone()),
                        }
                    }
                }
                for field_name in redeclared {
                    self.warn(
                        FieldCoordinate::new(&type_name, field_name),
                        format!("redeclared with a different type, \"{}\" wins", state.name),
                    );
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn merge_field(
        &mut self,
        state: &SubschemaState,
        type_name: &str,
        field: &Field<'static, String>,
    ) -> Result<(), CompositionError> {
        let coordinate = FieldCoordinate::new(type_name, &field.name);
        let mut stripped = field.clone();
        stripped
            .directives
            .retain(|directive| !is_stitching_directive(directive));

        let existing_signature = self
            .supergraph_object(type_name)
            .and_then(|object| object.fields.get(&field.name))
            .map(field_signature);

        if let Some(existing_signature) = existing_signature {
            let previous_owner = self.dispatch.get(&coordinate).cloned().unwrap_or_default();

            if type_name == QUERY_TYPE {
                let previous_is_entry = self
                    .subschemas
                    .get(&previous_owner)
                    .is_some_and(|previous| previous.entry_fields.contains_key(&field.name));
                let current_is_entry = state.entry_fields.contains_key(&field.name);

                if !previous_is_entry && !current_is_entry {
                    return Err(CompositionError::CompositionConflict {
                        coordinate: coordinate.to_string(),
                        first: previous_owner,
                        second: state.name.clone(),
                        reason: "root field is declared twice without a @merge relationship"
                            .to_string(),
                    });
                }

                self.warn(
                    &coordinate,
                    format!(
                        "root field of \"{}\" is replaced by \"{}\"",
                        previous_owner, state.name
                    ),
                );
            } else if existing_signature != field_signature(&stripped) {
                self.warn(
                    &coordinate,
                    format!(
                        "redeclared with a different definition, \"{}\" wins",
                        state.name
                    ),
                );
            }
        }

        if let Some(object) = self.supergraph_object_mut(type_name) {
            object.fields.insert(field.name.clone(), stripped);
        }
        self.dispatch.insert(coordinate, state.name.clone());

        Ok(())
    }

    fn supergraph_object(&self, type_name: &str) -> Option<&SupergraphObject> {
        match self.definitions.get(type_name) {
            Some(SupergraphDefinition::Object(object)) => Some(object),
            _ => None,
        }
    }

    fn supergraph_object_mut(&mut self, type_name: &str) -> Option<&mut SupergraphObject> {
        match self.definitions.get_mut(type_name) {
            Some(SupergraphDefinition::Object(object)) => Some(object),
            _ => None,
        }
    }

    fn build_merge_configs(&mut self) -> Result<HashMap<String, MergeConfig>, CompositionError> {
        let mut merge_configs: HashMap<String, MergeConfig> = HashMap::new();
        let mut replaced = vec![];

        for state in self.subschemas.values() {
            for (entry_field, directive) in &state.entry_fields {
                let Some(field) = state.field(QUERY_TYPE, entry_field) else {
                    continue;
                };
                let type_name = named_type(&field.field_type).to_string();

                let key = state
                    .keys
                    .get(&type_name)
                    .or_else(|| {
                        self.subschemas
                            .values()
                            .rev()
                            .find_map(|other| other.keys.get(&type_name))
                    })
                    .ok_or_else(|| CompositionError::MissingKeyDirective {
                        type_name: type_name.clone(),
                        reason: format!(
                            "entry field \"{}.{}\" of subschema \"{}\" returns it",
                            QUERY_TYPE, entry_field, state.name
                        ),
                    })?;

                let mappings = resolve_argument_mapping(state, entry_field, field, key, directive)?;

                let config = MergeConfig {
                    type_name: type_name.clone(),
                    owner: state.name.clone(),
                    entry_field: entry_field.clone(),
                    required_selection: key.clone(),
                    args_from_key: ArgsFromKey::new(mappings),
                };

                if let Some(previous) = merge_configs.insert(type_name.clone(), config) {
                    replaced.push((type_name, previous.owner, state.name.clone()));
                }
            }
        }

        for (type_name, previous, current) in replaced {
            self.warn(
                &type_name,
                format!(
                    "entry field of \"{}\" is replaced by the one of \"{}\"",
                    previous, current
                ),
            );
        }

        Ok(merge_configs)
    }

    fn finish(mut self) -> Result<Supergraph, CompositionError> {
        let merge_configs = self.build_merge_configs()?;

        for (type_name, definition) in &self.definitions {
            let SupergraphDefinition::Object(object) = definition else {
                continue;
            };
            if type_name == QUERY_TYPE
                || object.subschemas.len() < 2
                || merge_configs.contains_key(type_name)
            {
                continue;
            }

            let mut field_sets = object.subschemas.iter().filter_map(|name| {
                self.subschemas.get(name).map(|state| {
                    let mut fields = state.field_names(type_name);
                    fields.sort_unstable();
                    fields
                })
            });
            let first = field_sets.next().unwrap_or_default();
            if field_sets.any(|fields| fields != first) {
                return Err(CompositionError::MissingKeyDirective {
                    type_name: type_name.clone(),
                    reason: format!(
                        "its fields are split across subschemas {} and no entry field re-fetches it",
                        object
                            .subschemas
                            .iter()
                            .map(|name| format!("\"{}\"", name))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                });
            }
        }

        let mut keys_without_entry = vec![];
        let mut seen = HashSet::new();
        for state in self.subschemas.values() {
            for type_name in state.keys.keys() {
                if !merge_configs.contains_key(type_name) && seen.insert(type_name.clone()) {
                    keys_without_entry.push(type_name.clone());
                }
            }
        }
        for type_name in keys_without_entry {
            self.warn(
                &type_name,
                "declares a @key but no subschema provides an entry field for it".to_string(),
            );
        }

        for config in merge_configs.values() {
            if let Some(owner) = self.subschemas.get(&config.owner) {
                for field_name in owner.field_names(&config.type_name) {
                    self.dispatch.insert(
                        FieldCoordinate::new(&config.type_name, field_name),
                        config.owner.clone(),
                    );
                }
            }
        }

        let unresolved_root_fields: Vec<(String, String)> = self
            .supergraph_object(QUERY_TYPE)
            .map(|query| {
                query
                    .fields
                    .keys()
                    .filter_map(|field_name| {
                        let owner = self
                            .dispatch
                            .get(&FieldCoordinate::new(QUERY_TYPE, field_name))?;
                        let state = self.subschemas.get(owner)?;
                        (!state.resolved_root_fields.contains(field_name))
                            .then(|| (field_name.clone(), owner.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        for (field_name, owner) in unresolved_root_fields {
            self.warn(
                FieldCoordinate::new(QUERY_TYPE, field_name),
                format!("has no resolver in subschema \"{}\" and resolves to null", owner),
            );
        }

        info!(
            types = self.definitions.len(),
            merge_configs = merge_configs.len(),
            warnings = self.warnings.len(),
            "supergraph composed"
        );

        Ok(Supergraph {
            definitions: self.definitions,
            dispatch: self.dispatch,
            merge_configs,
            subschemas: self.subschemas,
            warnings: self.warnings,
        })
    }
}

fn resolve_argument_mapping(
    state: &SubschemaState,
    entry_field: &str,
    field: &Field<'static, String>,
    key: &[String],
    directive: &crate::directives::MergeDirective,
) -> Result<Vec<(String, String)>, CompositionError> {
    let malformed = |reason: String| {
        CompositionError::malformed(
            &state.name,
            format!("@merge on \"{}.{}\": {}", QUERY_TYPE, entry_field, reason),
        )
    };
    let arguments: Vec<String> = field.arguments.iter().map(|arg| arg.name.clone()).collect();
    let mappings = directive
        .argument_mapping(key, &arguments)
        .map_err(malformed)?;

    for (key_field, argument) in &mappings {
        if !key.contains(key_field) {
            return Err(malformed(format!(
                "\"{}\" is not part of the key {{ {} }}",
                key_field,
                key.join(" ")
            )));
        }
        if !arguments.contains(argument) {
            return Err(malformed(format!("unknown argument \"{}\"", argument)));
        }
    }
    if let Some(unmapped) = key
        .iter()
        .find(|key_field| !mappings.iter().any(|(mapped, _)| mapped == *key_field))
    {
        return Err(malformed(format!(
            "key field \"{}\" is not mapped to an argument",
            unmapped
        )));
    }

    if let Some(required) = field.arguments.iter().find(|arg| {
        matches!(arg.value_type, Type::NonNullType(_))
            && arg.default_value.is_none()
            && !mappings.iter().any(|(_, argument)| *argument == arg.name)
    }) {
        return Err(malformed(format!(
            "required argument \"{}\" is not fed by the key",
            required.name
        )));
    }

    Ok(mappings)
}

fn input_value_signature(value: &InputValue<'static, String>) -> String {
    match &value.default_value {
        Some(default) => format!("{}: {} = {}", value.name, value.value_type, default),
        None => format!("{}: {}", value.name, value.value_type),
    }
}

/// Type, arguments and non-stitching directives of a field, positions excluded.
fn field_signature(field: &Field<'static, String>) -> String {
    let arguments = field
        .arguments
        .iter()
        .map(input_value_signature)
        .collect::<Vec<_>>()
        .join(", ");
    let directives = field
        .directives
        .iter()
        .filter(|directive| !is_stitching_directive(directive))
        .map(|directive| {
            let arguments = directive
                .arguments
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect::<Vec<_>>()
                .join(", ");
            format!("@{}({})", directive.name, arguments)
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!("({}): {} {}", arguments, field.field_type, directives)
}
