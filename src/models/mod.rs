//! Data models shared by the execution layer and the native binding.

pub mod connection;
pub mod query;

pub use connection::DatabaseType;
pub use query::Arg;
