//! Query engine contract.

use crate::control::{
    DataSourceDefinition, ExecutionContext, ParameterTypes, ParameterValues, RawResultSet,
    ResourceReference,
};
use crate::error::EngineError;

/// Forces the engine to bypass its cached result for this execution.
pub const IC_REFRESH_KEY: &str = "com.jaspersoft.cascade.refresh";

/// URI of the report being diagnosed, when diagnostics are on.
pub const DIAGNOSTIC_REPORT_URI: &str = "com.jaspersoft.cascade.diagnostic.reportUri";

/// Diagnostic state handle, when diagnostics are on.
pub const DIAGNOSTIC_STATE: &str = "com.jaspersoft.cascade.diagnostic.state";

/// Engine-control flags copied from caller parameters regardless of query references.
pub const ENGINE_CONTROL_KEYS: [&str; 3] =
    [IC_REFRESH_KEY, DIAGNOSTIC_REPORT_URI, DIAGNOSTIC_STATE];

/// Everything the engine needs to run a control query.
#[derive(Debug, Clone, Copy)]
pub struct QueryRequest<'a> {
    pub query: &'a ResourceReference,
    pub value_column: &'a str,
    pub visible_columns: &'a [String],
    pub data_source: &'a ResourceReference,
    pub parameters: &'a ParameterValues,
    pub parameter_types: &'a ParameterTypes,
    pub control_name: &'a str,
}

/// Runs control queries against a data source.
pub trait QueryEngine: Send + Sync {
    /// Execute the query and return rows keyed by value column.
    ///
    /// # Errors
    ///
    /// [`EngineError::MissingDataSourceFields`] and [`EngineError::IllegalArgument`]
    /// signal schema drift; anything else is an execution failure.
    fn execute_query(
        &self,
        context: &ExecutionContext,
        request: &QueryRequest<'_>,
    ) -> Result<RawResultSet, EngineError>;

    /// Parameters describing the data source schema, merged into query parameters
    /// for data sources that need them (see [`crate::FilterResolver::needs_data_source_init`]).
    fn schema_parameters(
        &self,
        data_source: &DataSourceDefinition,
    ) -> Result<ParameterValues, EngineError>;
}
