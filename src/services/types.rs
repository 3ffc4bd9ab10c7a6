//! Parameter type lookup.

use crate::control::{ExecutionContext, ParameterTypes, ResourceReference};
use crate::error::ControlsError;
use std::collections::BTreeSet;

/// Supplies declared types for parameters the caller did not type.
pub trait ParameterTypeLookup: Send + Sync {
    /// Types for exactly `names`, scoped by `data_source`. Names the lookup knows
    /// nothing about may be left out of the result.
    ///
    /// # Errors
    ///
    /// [`ControlsError::ResourceNotFound`] when the data source cannot be resolved.
    fn parameter_types(
        &self,
        context: &ExecutionContext,
        data_source: &ResourceReference,
        names: &BTreeSet<String>,
    ) -> Result<ParameterTypes, ControlsError>;
}
