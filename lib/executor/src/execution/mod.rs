pub mod delegate;
pub mod error;
pub mod operation;
pub mod query_builder;
