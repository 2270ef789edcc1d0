pub mod context;
pub mod execution;
pub mod executors;
pub mod response;
pub mod utils;

#[cfg(test)]
mod tests;

pub use execution::delegate::{execute_query, DelegatingExecutor};
pub use executors::map::SubschemaExecutorMap;
pub use response::{graphql_error::GraphQLError, ExecutionResponse};
