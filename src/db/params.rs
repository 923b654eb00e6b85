//! Parameter binding for `Any` queries.

use crate::models::Arg;
use sqlx::Any;
use sqlx::any::AnyArguments;
use sqlx::query::Query;

/// Bind a single argument to a query.
pub(crate) fn bind_arg<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    arg: &'q Arg,
) -> Query<'q, Any, AnyArguments<'q>> {
    match arg {
        Arg::Null => query.bind(None::<String>),
        Arg::Bool(v) => query.bind(*v),
        Arg::Int(v) => query.bind(*v),
        Arg::Float(v) => query.bind(*v),
        Arg::String(v) => query.bind(v.as_str()),
        Arg::Bytes(v) => query.bind(v.as_slice()),
    }
}

/// Build a query with all positional arguments bound in order.
pub(crate) fn build_query<'q>(sql: &'q str, args: &'q [Arg]) -> Query<'q, Any, AnyArguments<'q>> {
    args.iter().fold(sqlx::query(sql), bind_arg)
}
