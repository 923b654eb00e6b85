//! Native driver binding over `sqlx`'s `Any` driver.
//!
//! - [`Database`]: pooled handle, installable in a [`Registry`](crate::Registry)
//! - [`SqlxTx`]: native transaction honoring [`Context`](crate::Context)
//! - Argument binding and row-to-JSON conversion

pub mod params;
pub mod pool;
pub mod transaction;
pub mod types;

pub use pool::Database;
pub use transaction::SqlxTx;
pub use types::RowToJson;
