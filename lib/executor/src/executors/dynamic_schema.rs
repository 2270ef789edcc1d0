use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_graphql::{
    dynamic::{
        Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Object, Scalar,
        Schema, TypeRef,
    },
    Name, QueryPathNode, QueryPathSegment,
};
use graphql_parser::schema::{self, Definition, ObjectType, Type, TypeDefinition};
use hive_stitching_composition::{FieldCoordinate, ResolverContext, ResolverParams, Subschema};
use hive_stitching_internal::events::{SharedEventSink, TracingEventSink};
use serde_json::{Map, Value};

use crate::{
    executors::error::SubschemaExecutorError,
    response::graphql_error::{GraphQLError, GraphQLErrorPathSegment},
    utils::value::to_const_value,
};

static BUILT_IN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

/// Request data: the sink resolvers emit their events to.
pub(crate) struct ResolverEvents(pub SharedEventSink);

/// Request data: resolver failures, recorded at the response path of the failing field.
///
/// The failing field resolves to null, so nullable fields keep their siblings and non-null
/// fields bubble the null to their parent.
#[derive(Default)]
pub(crate) struct ResolverErrors(Mutex<Vec<GraphQLError>>);

impl ResolverErrors {
    fn record(&self, error: GraphQLError) {
        if let Ok(mut errors) = self.0.lock() {
            errors.push(error);
        }
    }

    pub(crate) fn take(&self) -> Vec<GraphQLError> {
        self.0
            .lock()
            .map(|mut errors| std::mem::take(&mut *errors))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
enum OutputShape {
    Leaf,
    Enum,
    Object,
    List(Box<OutputShape>),
}

#[derive(Default)]
struct TypeKinds {
    enums: HashSet<String>,
    objects: HashSet<String>,
}

impl TypeKinds {
    fn output_shape(&self, field_type: &Type<'static, String>) -> OutputShape {
        match field_type {
            Type::NonNullType(inner) => self.output_shape(inner),
            Type::ListType(inner) => OutputShape::List(Box::new(self.output_shape(inner))),
            Type::NamedType(name) if self.enums.contains(name) => OutputShape::Enum,
            Type::NamedType(name) if self.objects.contains(name) => OutputShape::Object,
            Type::NamedType(_) => OutputShape::Leaf,
        }
    }
}

/// Builds an executable schema out of the subschema's type definitions and resolvers.
pub(crate) fn build_schema(subschema: &Subschema) -> Result<Schema, SubschemaExecutorError> {
    let document = subschema.document();
    let mut kinds = TypeKinds::default();
    for definition in &document.definitions {
        match definition {
            Definition::TypeDefinition(TypeDefinition::Enum(enum_type)) => {
                kinds.enums.insert(enum_type.name.clone());
            }
            Definition::TypeDefinition(TypeDefinition::Object(object)) => {
                kinds.objects.insert(object.name.clone());
            }
            _ => {}
        }
    }

    let mut builder = Schema::build(subschema.query_type(), None, None);
    for definition in &document.definitions {
        let Definition::TypeDefinition(type_definition) = definition else {
            continue;
        };

        builder = match type_definition {
            TypeDefinition::Object(object) => builder.register(build_object(subschema, object, &kinds)),
            TypeDefinition::Scalar(scalar) if !BUILT_IN_SCALARS.contains(&scalar.name.as_str()) => {
                builder.register(Scalar::new(scalar.name.as_str()))
            }
            TypeDefinition::Enum(enum_type) => builder.register(
                enum_type
                    .values
                    .iter()
                    .fold(Enum::new(enum_type.name.as_str()), |dynamic, value| {
                        dynamic.item(EnumItem::new(value.name.as_str()))
                    }),
            ),
            TypeDefinition::InputObject(input) => builder.register(
                input
                    .fields
                    .iter()
                    .fold(InputObject::new(input.name.as_str()), |dynamic, field| {
                        dynamic.field(build_input_value(field))
                    }),
            ),
            // Built-in scalars are known to the schema, abstract types never reach this point.
            _ => builder,
        };
    }

    builder.finish().map_err(|e| {
        SubschemaExecutorError::SchemaBuildFailure(subschema.name().to_string(), e.to_string())
    })
}

fn type_ref(field_type: &Type<'static, String>) -> TypeRef {
    match field_type {
        Type::NamedType(name) => TypeRef::named(name.as_str()),
        Type::ListType(inner) => TypeRef::List(Box::new(type_ref(inner))),
        Type::NonNullType(inner) => TypeRef::NonNull(Box::new(type_ref(inner))),
    }
}

fn build_input_value(value: &schema::InputValue<'static, String>) -> InputValue {
    let mut input = InputValue::new(value.name.as_str(), type_ref(&value.value_type));
    if let Some(description) = &value.description {
        input = input.description(description.as_str());
    }
    if let Some(default_value) = &value.default_value {
        input = input.default_value(to_const_value(default_value));
    }
    input
}

fn build_object(subschema: &Subschema, object: &ObjectType<'static, String>, kinds: &TypeKinds) -> Object {
    let mut dynamic = Object::new(object.name.as_str());
    if let Some(description) = &object.description {
        dynamic = dynamic.description(description.as_str());
    }

    for field in &object.fields {
        let mut dynamic_field = build_field(subschema, &object.name, field, kinds);
        if let Some(description) = &field.description {
            dynamic_field = dynamic_field.description(description.as_str());
        }
        for argument in &field.arguments {
            dynamic_field = dynamic_field.argument(build_input_value(argument));
        }
        dynamic = dynamic.field(dynamic_field);
    }

    dynamic
}

fn build_field(
    subschema: &Subschema,
    type_name: &str,
    field: &schema::Field<'static, String>,
    kinds: &TypeKinds,
) -> Field {
    let resolver = subschema.resolvers().get(type_name, &field.name).cloned();
    let shape = kinds.output_shape(&field.field_type);
    let field_name = field.name.clone();
    let coordinate = FieldCoordinate::new(type_name, &field.name);
    let subschema_name = subschema.shared_name();

    Field::new(field.name.as_str(), type_ref(&field.field_type), move |ctx| {
        let resolver = resolver.clone();
        let shape = shape.clone();
        let field_name = field_name.clone();
        let coordinate = coordinate.clone();
        let subschema_name = subschema_name.clone();

        FieldFuture::new(async move {
            let resolved: Result<Option<FieldValue>, async_graphql::Error> = async {
                let parent = ctx
                    .parent_value
                    .try_downcast_ref::<Value>()
                    .ok()
                    .cloned()
                    .unwrap_or(Value::Null);

                let value = match resolver {
                    Some(resolver) => {
                        let events = ctx
                            .data_opt::<ResolverEvents>()
                            .map(|events| events.0.clone())
                            .unwrap_or_else(|| Arc::new(TracingEventSink));
                        let args = ctx
                            .args
                            .as_index_map()
                            .iter()
                            .map(|(name, value)| Ok((name.to_string(), value.clone().into_json()?)))
                            .collect::<Result<Map<String, Value>, serde_json::Error>>()?;

                        resolver(ResolverParams {
                            parent,
                            args,
                            context: ResolverContext::new(subschema_name, coordinate, events),
                        })
                        .await?
                    }
                    // Default resolver: the parent's property of the same name.
                    None => parent.get(&field_name).cloned().unwrap_or(Value::Null),
                };

                into_field_value(value, &shape)
            }
            .await;

            match (resolved, ctx.data_opt::<Arc<ResolverErrors>>()) {
                (Err(error), Some(recorded)) => {
                    recorded.record(
                        GraphQLError::from(error.message)
                            .with_path(response_path(ctx.path_node.as_ref())),
                    );
                    Ok(None)
                }
                (resolved, _) => resolved,
            }
        })
    })
}

fn response_path(node: Option<&QueryPathNode<'_>>) -> Vec<GraphQLErrorPathSegment> {
    let mut path = vec![];
    let mut current = node;
    while let Some(node) = current {
        path.push(match node.segment {
            QueryPathSegment::Index(index) => GraphQLErrorPathSegment::Index(index),
            QueryPathSegment::Name(name) => GraphQLErrorPathSegment::String(name.to_string()),
        });
        current = node.parent;
    }
    path.reverse();
    path
}

/// Converts a resolver result into the shape of the declared output type.
fn into_field_value<'a>(
    value: Value,
    shape: &OutputShape,
) -> Result<Option<FieldValue<'a>>, async_graphql::Error> {
    if value.is_null() {
        return Ok(None);
    }

    match (shape, value) {
        (OutputShape::Leaf, value) => Ok(Some(FieldValue::value(
            async_graphql::Value::from_json(value)?,
        ))),
        (OutputShape::Enum, Value::String(item)) => Ok(Some(FieldValue::value(
            async_graphql::Value::Enum(Name::new(item)),
        ))),
        (OutputShape::Object, value @ Value::Object(_)) => Ok(Some(FieldValue::owned_any(value))),
        (OutputShape::List(item_shape), Value::Array(items)) => {
            let items = items
                .into_iter()
                .map(|item| Ok(into_field_value(item, item_shape)?.unwrap_or(FieldValue::NULL)))
                .collect::<Result<Vec<_>, async_graphql::Error>>()?;
            Ok(Some(FieldValue::list(items)))
        }
        (shape, value) => Err(async_graphql::Error::new(format!(
            "Resolved value {} does not match the declared {} type",
            value,
            match shape {
                OutputShape::Leaf => "scalar",
                OutputShape::Enum => "enum",
                OutputShape::Object => "object",
                OutputShape::List(_) => "list",
            }
        ))),
    }
}
