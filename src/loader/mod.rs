//! Loading the candidate values of query-backed input controls.
//!
//! A load runs the control query with reconciled parameters and turns the rows
//! into a page of labelled [`ValueItem`]s:
//!
//! 1. resolve the data source (the query's own one wins over the report's)
//! 2. reconcile parameters and complete their types
//! 3. execute the query; schema drift yields "no values" instead of an error
//! 4. add the "nothing selected" row for optional single-select controls
//! 5. count matches, build the filtered list and cut the requested page
//!
//! The whole load is bracketed by an audit event.
//!
//! # Examples
//!
//! ```no_run
//! use cascade_controls::{ControlsConfig, LoaderServices, QueryValuesLoader, ValuesLoader};
//! use cascade_controls::{
//!     ControlDefinition, ParameterTypes, ParameterValues, ResourceReference, Value,
//! };
//!
//! # fn services() -> LoaderServices { todo!() }
//! let loader = QueryValuesLoader::new(services(), ControlsConfig::default());
//! let control = ControlDefinition::new(
//!     "Country",
//!     "/reports/sales/Country",
//!     ResourceReference::new("/queries/countries"),
//!     "country_code",
//!     vec!["country_name".to_string()],
//! );
//!
//! let mut parameters = ParameterValues::new();
//! parameters.insert("Country_limit".to_string(), Value::Int(20));
//! let items = loader.load_values(
//!     &control,
//!     &ResourceReference::new("/datasources/warehouse"),
//!     &mut parameters,
//!     &ParameterTypes::new(),
//!     None,
//!     true,
//! )?;
//! let total = &parameters["Country_totalCount"];
//! # Ok::<(), cascade_controls::ControlsError>(())
//! ```

pub mod audit;
pub(crate) mod error_handling;
pub(crate) mod execution;
pub mod label;
pub mod window;

use crate::config::ControlsConfig;
use crate::control::{
    ControlDefinition, ControlInformation, ExecutionContext, ParameterTypes, ParameterValues,
    QueryDefinition, Resource, ResourceReference, ValueItem, ValuesPage,
};
use crate::error::ControlsError;
use crate::parameters::{ParameterResolver, TypeResolver};
use crate::services::{
    AuditContext, FilterResolver, ParameterTypeLookup, QueryEngine, QueryRequest, Repository,
    ValueFormatter,
};
use crate::value::Value;
use audit::AuditScope;
use label::LabelFormatter;
use std::collections::BTreeSet;
use std::sync::Arc;
use window::{total_count_key, ResultWindower, WindowSpec};

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Loads the candidate values of an input control.
pub trait ValuesLoader {
    /// Candidate values for `control` given the current selections in `parameters`.
    ///
    /// Returns `Ok(None)` when the control has no candidate values at all. The
    /// number of values matching the control's criteria is written back to
    /// `parameters` under `<control name>_totalCount`.
    fn load_values(
        &self,
        control: &ControlDefinition,
        data_source: &ResourceReference,
        parameters: &mut ParameterValues,
        parameter_types: &ParameterTypes,
        info: Option<&ControlInformation>,
        is_single_select: bool,
    ) -> Result<Option<Vec<ValueItem>>, ControlsError>;

    /// Names of the parameters (other controls) `control` depends on.
    fn master_dependencies(
        &self,
        control: &ControlDefinition,
        data_source: &ResourceReference,
    ) -> Result<BTreeSet<String>, ControlsError>;
}

/// Collaborators used by [`QueryValuesLoader`].
#[derive(Clone)]
pub struct LoaderServices {
    pub repository: Arc<dyn Repository>,
    pub engine: Arc<dyn QueryEngine>,
    pub filter_resolver: Arc<dyn FilterResolver>,
    pub type_lookup: Arc<dyn ParameterTypeLookup>,
    pub formatter: Arc<dyn ValueFormatter>,
    pub audit: Arc<dyn AuditContext>,
}

/// [`ValuesLoader`] for controls backed by a repository query.
///
/// Holds no per-load state, so one instance can serve concurrent loads.
pub struct QueryValuesLoader {
    services: LoaderServices,
    config: ControlsConfig,
    context: ExecutionContext,
}

impl QueryValuesLoader {
    pub fn new(services: LoaderServices, config: ControlsConfig) -> Self {
        Self {
            services,
            config,
            context: ExecutionContext::default(),
        }
    }

    /// Use `context` for query execution and type lookups.
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    fn parameter_resolver(&self) -> ParameterResolver<'_> {
        ParameterResolver::new(
            &*self.services.repository,
            &*self.services.engine,
            &*self.services.filter_resolver,
        )
    }

    /// Data source the control query runs against: the query's own data source
    /// when it declares one, `report_data_source` otherwise.
    pub fn resolve_data_source(
        &self,
        control: &ControlDefinition,
        report_data_source: &ResourceReference,
    ) -> Result<ResourceReference, ControlsError> {
        match self.services.repository.get_resource(&control.query)? {
            Resource::Query(QueryDefinition {
                data_source: Some(data_source),
                ..
            }) => Ok(data_source),
            _ => Ok(report_data_source.clone()),
        }
    }

    /// Run the load and return the page and total count without touching `parameters`.
    pub fn load_page(
        &self,
        control: &ControlDefinition,
        data_source: &ResourceReference,
        parameters: &ParameterValues,
        parameter_types: &ParameterTypes,
        info: Option<&ControlInformation>,
        is_single_select: bool,
    ) -> Result<ValuesPage, ControlsError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::load_values_span(&control.name).entered();
        #[cfg(feature = "metrics")]
        let start = std::time::Instant::now();

        let _audit = if self.config.audit_enabled {
            AuditScope::open(&*self.services.audit, &control.uri, parameters)
        } else {
            AuditScope::disabled()
        };

        let page = self.run_load(
            control,
            data_source,
            parameters,
            parameter_types,
            info,
            is_single_select,
        );

        #[cfg(feature = "metrics")]
        METRICS.record_load(start.elapsed());
        page
    }

    fn run_load(
        &self,
        control: &ControlDefinition,
        data_source: &ResourceReference,
        parameters: &ParameterValues,
        parameter_types: &ParameterTypes,
        info: Option<&ControlInformation>,
        is_single_select: bool,
    ) -> Result<ValuesPage, ControlsError> {
        let data_source_for_query = self.resolve_data_source(control, data_source)?;
        let query = self.services.repository.get_query(&control.query)?;

        let resolver = self.parameter_resolver();
        let schema = resolver.schema_parameters(&data_source_for_query)?;
        let mut execution_parameters = resolver.resolve(&query, parameters, &schema);
        // Types are looked up against the report data source
        let execution_types = TypeResolver::new(&*self.services.type_lookup).resolve(
            &self.context,
            data_source,
            &execution_parameters,
            parameter_types,
        )?;
        ParameterResolver::copy_engine_flags(parameters, &mut execution_parameters);

        let request = QueryRequest {
            query: &control.query,
            value_column: &control.value_column,
            visible_columns: &control.visible_columns,
            data_source: &data_source_for_query,
            parameters: &execution_parameters,
            parameter_types: &execution_types,
            control_name: &control.name,
        };
        let Some(mut results) =
            execution::execute_query(&*self.services.engine, &self.context, &request)?
        else {
            return Ok(ValuesPage::default());
        };

        if is_single_select && !control.mandatory {
            ResultWindower::insert_nothing_row(&mut results);
        }
        if results.is_empty() {
            return Ok(ValuesPage::default());
        }

        let window = WindowSpec::from_parameters(control, parameters, self.config.max_limit)
            .inspect_err(|_| {
                #[cfg(feature = "metrics")]
                METRICS.record_validation_failure();
            })?;

        let labels = LabelFormatter::new(&*self.services.formatter, control, info);
        let (items, total_count) = ResultWindower::new(labels).window(&results, &window)?;
        log::debug!(
            "control {}: {} item(s) on page, {} total",
            control.name,
            items.len(),
            total_count
        );

        Ok(ValuesPage {
            items: Some(items),
            total_count: Some(total_count),
        })
    }
}

impl ValuesLoader for QueryValuesLoader {
    fn load_values(
        &self,
        control: &ControlDefinition,
        data_source: &ResourceReference,
        parameters: &mut ParameterValues,
        parameter_types: &ParameterTypes,
        info: Option<&ControlInformation>,
        is_single_select: bool,
    ) -> Result<Option<Vec<ValueItem>>, ControlsError> {
        let page = self.load_page(
            control,
            data_source,
            parameters,
            parameter_types,
            info,
            is_single_select,
        )?;
        if let Some(total) = page.total_count {
            parameters.insert(
                total_count_key(&control.name),
                Value::Int(i64::try_from(total).unwrap_or(i64::MAX)),
            );
        }
        Ok(page.items)
    }

    fn master_dependencies(
        &self,
        control: &ControlDefinition,
        data_source: &ResourceReference,
    ) -> Result<BTreeSet<String>, ControlsError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::master_dependencies_span(&control.name).entered();

        let data_source_for_query = self.resolve_data_source(control, data_source)?;
        let resolver = self.parameter_resolver();
        let schema = resolver.schema_parameters(&data_source_for_query)?;
        let query = self.services.repository.get_query(&control.query)?;
        Ok(resolver.referenced_names(&query, &schema))
    }
}
