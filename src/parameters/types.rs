//! Completes the parameter type map for an execution.

use crate::control::{ExecutionContext, ParameterTypes, ParameterValues, ResourceReference};
use crate::error::ControlsError;
use crate::services::ParameterTypeLookup;
use std::collections::BTreeSet;

pub struct TypeResolver<'a> {
    lookup: &'a dyn ParameterTypeLookup,
}

impl<'a> TypeResolver<'a> {
    pub fn new(lookup: &'a dyn ParameterTypeLookup) -> Self {
        Self { lookup }
    }

    /// Types for every parameter in `resolved`.
    ///
    /// Caller types are kept for resolved names only; names still untyped are
    /// asked of the lookup in one call, which is skipped when nothing is missing.
    pub fn resolve(
        &self,
        context: &ExecutionContext,
        data_source: &ResourceReference,
        resolved: &ParameterValues,
        caller_types: &ParameterTypes,
    ) -> Result<ParameterTypes, ControlsError> {
        let mut types: ParameterTypes = caller_types
            .iter()
            .filter(|(name, _)| resolved.contains_key(*name))
            .map(|(name, ty)| (name.clone(), ty.clone()))
            .collect();

        let missing: BTreeSet<String> = resolved
            .keys()
            .filter(|name| !types.contains_key(*name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            log::debug!("looking up types for {missing:?} in {data_source}");
            types.extend(self.lookup.parameter_types(context, data_source, &missing)?);
        }
        Ok(types)
    }
}
