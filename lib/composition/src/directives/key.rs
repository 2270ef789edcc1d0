use graphql_parser::schema::Directive;

use super::{string_argument, StitchingDirective};
use crate::utils::parsing::parse_field_set;

/// `@key(selectionSet: "{ _id }")` marks an object type as an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDirective {
    pub fields: Vec<String>,
}

impl KeyDirective {
    pub const NAME: &str = "key";

    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn selection_set(&self) -> String {
        format!("{{ {} }}", self.fields.join(" "))
    }
}

impl StitchingDirective for KeyDirective {
    fn directive_name() -> &'static str {
        Self::NAME
    }

    fn parse(directive: &Directive<'_, String>) -> Result<Self, String> {
        let mut selection_set = None;

        for (arg_name, arg_value) in &directive.arguments {
            if arg_name.eq("selectionSet") {
                selection_set = Some(string_argument(Self::NAME, arg_name, arg_value)?);
            } else {
                return Err(format!("unknown argument \"{}\" on @key", arg_name));
            }
        }

        let selection_set =
            selection_set.ok_or_else(|| "@key requires a selectionSet argument".to_string())?;

        Ok(Self {
            fields: parse_field_set(&selection_set)?,
        })
    }

    fn arguments(&self) -> Vec<(&'static str, String)> {
        vec![("selectionSet", self.selection_set())]
    }
}
