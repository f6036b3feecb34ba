//! Store operation counters

use nrf_store::StoreError;

/// Counter of store calls, labelled by method, operation, table and outcome
pub const DB_OPERATIONS_TOTAL: &str = "nrf_db_operations_total";

/// Caller-facing method that triggered a store call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DbMethod {
    Get,
    Put,
    Patch,
    Post,
}

impl DbMethod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DbOperation {
    Find,
    Update,
    Create,
}

impl DbOperation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::Update => "update",
            Self::Create => "create",
        }
    }
}

/// Count a store call and pass its result through
pub(crate) fn observe<T>(
    method: DbMethod,
    operation: DbOperation,
    table: &'static str,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    let outcome = if result.is_ok() { "success" } else { "failure" };
    metrics::counter!(
        DB_OPERATIONS_TOTAL,
        "method" => method.as_str(),
        "operation" => operation.as_str(),
        "table" => table,
        "outcome" => outcome
    )
    .increment(1);
    result
}
