//! Error classification for query execution.

use crate::error::EngineError;

/// Check if an engine error means the data source schema moved under the query.
///
/// Both a field missing from the data source and an argument the engine no longer
/// accepts show up when a control was defined against an older schema. These are
/// reported as "no values" rather than as failures.
pub(crate) fn is_schema_drift_error(error: &EngineError) -> bool {
    match error {
        EngineError::MissingDataSourceFields(_) => true,
        EngineError::IllegalArgument(_) => true,
        EngineError::Execution(_) => false,
    }
}
