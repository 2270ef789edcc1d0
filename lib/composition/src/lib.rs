pub mod annotator;
pub mod directives;
pub mod error;
pub mod subschema;
pub mod supergraph;
pub mod utils;


pub use annotator::{annotate, EntityAnnotation};
pub use error::CompositionError;
pub use subschema::{
    resolver::{FieldCoordinate, ResolverContext, ResolverError, ResolverMap, ResolverParams},
    Subschema, SubschemaBuilder,
};
pub use supergraph::{compose, merge_config::MergeConfig, Supergraph, QUERY_TYPE};
