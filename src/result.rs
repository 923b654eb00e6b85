//! Outcome of a mutating statement.

/// Rows affected plus a last-inserted-id placeholder.
///
/// The wrapped driver does not report generated identifiers for these
/// statements, so [`last_insert_id`](ExecResult::last_insert_id) is always `0`.
/// Callers that need a generated key should use `RETURNING` with `query_row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    last_insert_id: i64,
    rows_affected: u64,
}

impl ExecResult {
    pub fn new(rows_affected: u64) -> Self {
        Self {
            last_insert_id: 0,
            rows_affected,
        }
    }

    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}
