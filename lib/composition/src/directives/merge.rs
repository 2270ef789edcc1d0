use graphql_parser::schema::Directive;

use super::{string_argument, StitchingDirective};

/// `@merge` marks a query root field as the entry point re-fetching an entity by key.
///
/// Without arguments every key field feeds the argument of the same name. `keyField`/`keyArg`
/// remap a single key field, `argsExpr` (`"id: $key._id, code: $key.tenant"`) maps several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeDirective {
    pub key_field: Option<String>,
    pub key_arg: Option<String>,
    pub args_expr: Option<String>,
}

const KEY_REFERENCE_PREFIX: &str = "$key.";

impl MergeDirective {
    pub const NAME: &str = "merge";

    /// Resolves the `(key field, argument)` pairs for an entry field accepting `entry_arguments`.
    pub fn argument_mapping(
        &self,
        key_fields: &[String],
        entry_arguments: &[String],
    ) -> Result<Vec<(String, String)>, String> {
        if let Some(args_expr) = &self.args_expr {
            return parse_args_expr(args_expr);
        }

        if let Some(key_field) = &self.key_field {
            let argument = match (&self.key_arg, entry_arguments) {
                (Some(key_arg), _) => key_arg.clone(),
                (None, [only]) => only.clone(),
                (None, _) => key_field.clone(),
            };
            return Ok(vec![(key_field.clone(), argument)]);
        }

        if let Some(key_arg) = &self.key_arg {
            return match key_fields {
                [only] => Ok(vec![(only.clone(), key_arg.clone())]),
                _ => Err("keyArg without keyField requires a single-field key".to_string()),
            };
        }

        Ok(key_fields
            .iter()
            .map(|field| (field.clone(), field.clone()))
            .collect())
    }
}

fn parse_args_expr(args_expr: &str) -> Result<Vec<(String, String)>, String> {
    let mut mapping = vec![];

    for pair in args_expr.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (argument, reference) = pair
            .split_once(':')
            .ok_or_else(|| format!("expected \"argument: $key.field\", got \"{}\"", pair))?;
        let key_field = reference
            .trim()
            .strip_prefix(KEY_REFERENCE_PREFIX)
            .filter(|field| !field.is_empty())
            .ok_or_else(|| {
                format!(
                    "argument \"{}\" must reference a key field as $key.<field>",
                    argument.trim()
                )
            })?;

        mapping.push((key_field.to_string(), argument.trim().to_string()));
    }

    if mapping.is_empty() {
        return Err("argsExpr is empty".to_string());
    }

    Ok(mapping)
}

impl StitchingDirective for MergeDirective {
    fn directive_name() -> &'static str {
        Self::NAME
    }

    fn parse(directive: &Directive<'_, String>) -> Result<Self, String> {
        let mut result = Self::default();

        for (arg_name, arg_value) in &directive.arguments {
            let value = string_argument(Self::NAME, arg_name, arg_value)?;
            match arg_name.as_str() {
                "keyField" => result.key_field = Some(value),
                "keyArg" => result.key_arg = Some(value),
                "argsExpr" => result.args_expr = Some(value),
                other => return Err(format!("unknown argument \"{}\" on @merge", other)),
            }
        }

        Ok(result)
    }

    fn arguments(&self) -> Vec<(&'static str, String)> {
        [
            ("keyField", &self.key_field),
            ("keyArg", &self.key_arg),
            ("argsExpr", &self.args_expr),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|value| (name, value)))
        .collect()
    }
}
