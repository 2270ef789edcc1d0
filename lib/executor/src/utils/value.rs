use graphql_parser::query::Value as AstValue;
use serde_json::{Map, Number, Value};

/// Converts a literal of the client document to JSON. Variables are looked up in `variables`
/// and resolve to `null` when absent.
pub fn to_json(value: &AstValue<'static, String>, variables: &Map<String, Value>) -> Value {
    match value {
        AstValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
        AstValue::Int(number) => number.as_i64().map(Value::from).unwrap_or(Value::Null),
        AstValue::Float(float) => Number::from_f64(*float)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AstValue::String(string) => Value::String(string.clone()),
        AstValue::Boolean(boolean) => Value::Bool(*boolean),
        AstValue::Null => Value::Null,
        AstValue::Enum(item) => Value::String(item.clone()),
        AstValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| to_json(item, variables))
                .collect(),
        ),
        AstValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), to_json(value, variables)))
                .collect(),
        ),
    }
}

/// Converts a schema default value, enum literals kept as enums.
pub fn to_const_value(value: &AstValue<'static, String>) -> async_graphql::Value {
    match value {
        AstValue::Enum(item) => async_graphql::Value::Enum(async_graphql::Name::new(item)),
        AstValue::List(items) => {
            async_graphql::Value::List(items.iter().map(to_const_value).collect())
        }
        AstValue::Object(fields) => async_graphql::Value::Object(
            fields
                .iter()
                .map(|(name, value)| (async_graphql::Name::new(name), to_const_value(value)))
                .collect(),
        ),
        other => async_graphql::Value::from_json(to_json(other, &Map::new()))
            .unwrap_or(async_graphql::Value::Null),
    }
}
