mod key;
mod merge;

pub use key::KeyDirective;
pub use merge::MergeDirective;

use graphql_parser::{
    schema::{Directive, Value},
    Pos,
};

/// Directive definitions appended to annotated subschemas.
pub const STITCHING_DIRECTIVE_DEFINITIONS: &str = r#"
directive @key(selectionSet: String!) on OBJECT
directive @merge(keyField: String, keyArg: String, argsExpr: String) on FIELD_DEFINITION
"#;

pub trait StitchingDirective: Sized {
    fn directive_name() -> &'static str;

    fn is(directive: &Directive<'_, String>) -> bool {
        Self::directive_name() == directive.name
    }

    fn parse(directive: &Directive<'_, String>) -> Result<Self, String>;

    /// Arguments of the printed form, in declaration order.
    fn arguments(&self) -> Vec<(&'static str, String)>;

    fn to_directive(&self) -> Directive<'static, String> {
        Directive {
            position: Pos::default(),
            name: Self::directive_name().to_string(),
            arguments: self
                .arguments()
                .into_iter()
                .map(|(name, value)| (name.to_string(), Value::String(value)))
                .collect(),
        }
    }

    fn find(directives: &[Directive<'_, String>]) -> Result<Option<Self>, String> {
        directives
            .iter()
            .find(|directive| Self::is(directive))
            .map(Self::parse)
            .transpose()
    }
}

fn string_argument(
    directive_name: &str,
    arg_name: &str,
    value: &Value<'_, String>,
) -> Result<String, String> {
    match value {
        Value::String(value) => Ok(value.clone()),
        other => Err(format!(
            "argument \"{}\" of @{} must be a string, got {}",
            arg_name, directive_name, other
        )),
    }
}

/// `@key` and `@merge` are stripped when printing the supergraph.
pub fn is_stitching_directive(directive: &Directive<'_, String>) -> bool {
    KeyDirective::is(directive) || MergeDirective::is(directive)
}
