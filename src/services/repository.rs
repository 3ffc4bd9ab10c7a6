//! Repository access.

use crate::control::{DataSourceDefinition, QueryDefinition, Resource, ResourceReference};
use crate::error::ControlsError;

/// Resolves named references to repository resources.
pub trait Repository: Send + Sync {
    /// Resolve `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlsError::ResourceNotFound`] when nothing lives at the reference.
    fn get_resource(&self, reference: &ResourceReference) -> Result<Resource, ControlsError>;

    /// Resolve `reference` and require it to be a query.
    fn get_query(&self, reference: &ResourceReference) -> Result<QueryDefinition, ControlsError> {
        match self.get_resource(reference)? {
            Resource::Query(query) => Ok(query),
            other => Err(ControlsError::UnexpectedResource {
                uri: reference.uri().to_string(),
                expected: "query",
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Resolve `reference` and require it to be a data source.
    fn get_data_source(
        &self,
        reference: &ResourceReference,
    ) -> Result<DataSourceDefinition, ControlsError> {
        match self.get_resource(reference)? {
            Resource::DataSource(data_source) => Ok(data_source),
            other => Err(ControlsError::UnexpectedResource {
                uri: reference.uri().to_string(),
                expected: "data source",
                found: other.type_name().to_string(),
            }),
        }
    }
}
