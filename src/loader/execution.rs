//! Tolerant query execution.

use super::error_handling::is_schema_drift_error;
use crate::control::{ExecutionContext, RawResultSet};
use crate::error::ControlsError;
use crate::services::{QueryEngine, QueryRequest};

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Run the control query.
///
/// Returns `Ok(None)` when the engine reports schema drift; the failure is only
/// logged at debug level. All other engine failures propagate.
pub(crate) fn execute_query(
    engine: &dyn QueryEngine,
    context: &ExecutionContext,
    request: &QueryRequest<'_>,
) -> Result<Option<RawResultSet>, ControlsError> {
    #[cfg(feature = "tracing")]
    let _span =
        tracing_helpers::execute_query_span(request.control_name, request.data_source.uri())
            .entered();

    match engine.execute_query(context, request) {
        Ok(results) => {
            log::debug!(
                "query {} returned {} row(s) for control {}",
                request.query,
                results.len(),
                request.control_name
            );
            Ok(Some(results))
        }
        Err(err) if is_schema_drift_error(&err) => {
            log::debug!(
                "ignoring query failure for control {}: {err:?}",
                request.control_name
            );
            #[cfg(feature = "metrics")]
            METRICS.record_schema_drift();
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
