//! Query parameter discovery.

use crate::control::{DataSourceDefinition, ParameterValues};
use std::collections::BTreeSet;

/// Knows which parameters a query references and whether a data source needs
/// schema parameters before its queries can be analysed.
pub trait FilterResolver: Send + Sync {
    /// Names of the parameters `query_text` references.
    ///
    /// `candidates` holds every parameter known at this point (caller values plus
    /// schema parameters); resolvers that need schema context read it from there.
    fn parameter_names(&self, query_text: &str, candidates: &ParameterValues) -> BTreeSet<String>;

    /// Whether schema parameters must be prepared for `data_source`.
    fn needs_data_source_init(&self, data_source: &DataSourceDefinition) -> bool;
}
