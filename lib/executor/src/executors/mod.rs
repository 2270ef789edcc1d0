pub mod common;
mod dynamic_schema;
pub mod error;
pub mod local;
pub mod map;
pub mod simulated;
pub mod timeout;
