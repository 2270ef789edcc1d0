use serde::Serialize;
use serde_json::{Map, Value};

/// How to complete a stub of `type_name` produced by another subschema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeConfig {
    pub type_name: String,
    /// The subschema declaring the entry field.
    pub owner: String,
    /// Query root field re-fetching one instance by key.
    pub entry_field: String,
    /// Key fields every stub must carry.
    pub required_selection: Vec<String>,
    pub args_from_key: ArgsFromKey,
}

/// Maps the key values of a stub to the arguments of the entry field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgsFromKey {
    /// `(key field, argument)` pairs, in argument order.
    mappings: Vec<(String, String)>,
}

impl ArgsFromKey {
    pub fn new(mappings: Vec<(String, String)>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[(String, String)] {
        &self.mappings
    }

    /// Builds the argument record. Key fields absent from `key` are left out.
    pub fn apply(&self, key: &Map<String, Value>) -> Map<String, Value> {
        self.mappings
            .iter()
            .filter_map(|(key_field, argument)| {
                key.get(key_field)
                    .map(|value| (argument.clone(), value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ArgsFromKey;

    #[test]
    fn renames_key_fields_to_arguments() {
        let args_from_key = ArgsFromKey::new(vec![
            ("_id".to_string(), "id".to_string()),
            ("tenantCode".to_string(), "code".to_string()),
        ]);
        let key = json!({ "_id": "c1", "tenantCode": "t1", "name": "ignored" });

        assert_eq!(
            serde_json::Value::Object(args_from_key.apply(key.as_object().unwrap())),
            json!({ "id": "c1", "code": "t1" })
        );
    }
}
