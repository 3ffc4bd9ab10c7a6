//! Computes the exact parameter set a control query runs with.

use crate::control::{ParameterValues, QueryDefinition, ResourceReference};
use crate::error::ControlsError;
use crate::services::engine::ENGINE_CONTROL_KEYS;
use crate::services::{FilterResolver, QueryEngine, Repository};
use crate::value::Value;
use std::collections::BTreeSet;

/// Reconciles caller parameters, schema parameters and query references.
pub struct ParameterResolver<'a> {
    repository: &'a dyn Repository,
    engine: &'a dyn QueryEngine,
    filter_resolver: &'a dyn FilterResolver,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(
        repository: &'a dyn Repository,
        engine: &'a dyn QueryEngine,
        filter_resolver: &'a dyn FilterResolver,
    ) -> Self {
        Self {
            repository,
            engine,
            filter_resolver,
        }
    }

    /// Schema parameters for `data_source`, empty unless the data source needs them.
    ///
    /// Only data sources flagged by [`FilterResolver::needs_data_source_init`]
    /// pay for preparing the schema.
    ///
    /// # Errors
    ///
    /// Fails when the reference does not resolve to a data source or the engine
    /// cannot produce the schema parameters.
    pub fn schema_parameters(
        &self,
        data_source: &ResourceReference,
    ) -> Result<ParameterValues, ControlsError> {
        let data_source = self.repository.get_data_source(data_source)?;
        if !self.filter_resolver.needs_data_source_init(&data_source) {
            return Ok(ParameterValues::new());
        }
        let schema = self.engine.schema_parameters(&data_source)?;
        log::debug!(
            "prepared {} schema parameter(s) for data source {}",
            schema.len(),
            data_source.uri
        );
        Ok(schema)
    }

    /// Names of the parameters `query` references given `candidates`.
    pub fn referenced_names(
        &self,
        query: &QueryDefinition,
        candidates: &ParameterValues,
    ) -> BTreeSet<String> {
        self.filter_resolver.parameter_names(&query.sql, candidates)
    }

    /// Parameters for executing `query`.
    ///
    /// Every referenced name is present in the result: the caller's value when
    /// there is one, [`Value::Null`] otherwise. Schema parameters are applied last
    /// and win over caller values of the same name. Unreferenced caller
    /// parameters are dropped.
    pub fn resolve(
        &self,
        query: &QueryDefinition,
        parameters: &ParameterValues,
        schema: &ParameterValues,
    ) -> ParameterValues {
        let mut with_schema = parameters.clone();
        with_schema.extend(schema.iter().map(|(k, v)| (k.clone(), v.clone())));

        let names = self.referenced_names(query, &with_schema);
        let mut resolved = ParameterValues::with_capacity(names.len() + schema.len());
        for name in names {
            let value = match parameters.get(&name) {
                Some(value) => value.clone(),
                None => {
                    // Missing selection still has to reach the engine, as null
                    log::trace!("query {} references unset parameter {name}", query.uri);
                    Value::Null
                }
            };
            resolved.insert(name, value);
        }
        resolved.extend(schema.iter().map(|(k, v)| (k.clone(), v.clone())));
        resolved
    }

    /// Copy the engine-control flags present in `parameters` into `resolved`.
    pub fn copy_engine_flags(parameters: &ParameterValues, resolved: &mut ParameterValues) {
        for key in ENGINE_CONTROL_KEYS {
            if let Some(value) = parameters.get(key) {
                resolved.insert(key.to_string(), value.clone());
            }
        }
    }
}
