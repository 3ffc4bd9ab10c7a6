//! In-memory collaborators for unit tests.

use crate::config::ControlsConfig;
use crate::control::{
    ControlDefinition, ControlInformation, DataSourceDefinition, DataSourceKind, ExecutionContext,
    ParameterTypes, ParameterValues, QueryDefinition, RawResultSet, Resource, ResourceReference,
};
use crate::error::{ControlsError, EngineError};
use crate::loader::{LoaderServices, QueryValuesLoader};
use crate::parameters::QueryParameterScanner;
use crate::services::{
    InMemoryAuditContext, ParameterTypeLookup, QueryEngine, QueryRequest, Repository,
    ValueFormatter,
};
use crate::value::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

pub fn params(entries: &[(&str, Value)]) -> ParameterValues {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub fn rows(entries: Vec<(Value, Vec<Value>)>) -> RawResultSet {
    entries.into_iter().collect()
}

/// Control named after its value column, backed by `/queries/q`.
pub fn control(value_column: &str, visible_columns: &[&str]) -> ControlDefinition {
    ControlDefinition::new(
        value_column,
        format!("/controls/{value_column}"),
        ResourceReference::new("/queries/q"),
        value_column,
        visible_columns.iter().map(|c| c.to_string()).collect(),
    )
}

#[derive(Default)]
pub struct MockRepository {
    resources: HashMap<String, Resource>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, uri: &str, sql: &str, data_source: Option<&str>) -> Self {
        self.resources.insert(
            uri.to_string(),
            Resource::Query(QueryDefinition {
                uri: uri.to_string(),
                sql: sql.to_string(),
                language: "sql".to_string(),
                data_source: data_source.map(ResourceReference::new),
            }),
        );
        self
    }

    pub fn with_data_source(mut self, uri: &str, kind: DataSourceKind) -> Self {
        self.resources.insert(
            uri.to_string(),
            Resource::DataSource(DataSourceDefinition {
                uri: uri.to_string(),
                kind,
            }),
        );
        self
    }
}

impl Repository for MockRepository {
    fn get_resource(&self, reference: &ResourceReference) -> Result<Resource, ControlsError> {
        self.resources
            .get(reference.uri())
            .cloned()
            .ok_or_else(|| ControlsError::ResourceNotFound(reference.uri().to_string()))
    }
}

/// Owned copy of a [`QueryRequest`] seen by [`MockEngine`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub parameters: ParameterValues,
    pub parameter_types: ParameterTypes,
    pub data_source: ResourceReference,
    pub control_name: String,
}

pub struct MockEngine {
    outcome: Result<RawResultSet, EngineError>,
    schema: ParameterValues,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockEngine {
    fn with_outcome(outcome: Result<RawResultSet, EngineError>) -> Self {
        Self {
            outcome,
            schema: ParameterValues::new(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn empty() -> Self {
        Self::with_outcome(Ok(RawResultSet::new()))
    }

    pub fn returning(results: RawResultSet) -> Self {
        Self::with_outcome(Ok(results))
    }

    pub fn failing(error: EngineError) -> Self {
        Self::with_outcome(Err(error))
    }

    pub fn with_schema(mut self, schema: ParameterValues) -> Self {
        self.schema = schema;
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl QueryEngine for MockEngine {
    fn execute_query(
        &self,
        _context: &ExecutionContext,
        request: &QueryRequest<'_>,
    ) -> Result<RawResultSet, EngineError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            parameters: request.parameters.clone(),
            parameter_types: request.parameter_types.clone(),
            data_source: request.data_source.clone(),
            control_name: request.control_name.to_string(),
        });
        self.outcome.clone()
    }

    fn schema_parameters(
        &self,
        _data_source: &DataSourceDefinition,
    ) -> Result<ParameterValues, EngineError> {
        Ok(self.schema.clone())
    }
}

/// Knows a fixed set of types and records every lookup.
pub struct MockTypeLookup {
    known: ParameterTypes,
    calls: Mutex<Vec<BTreeSet<String>>>,
}

impl MockTypeLookup {
    pub fn new(known: ParameterTypes) -> Self {
        Self {
            known,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<BTreeSet<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ParameterTypeLookup for MockTypeLookup {
    fn parameter_types(
        &self,
        _context: &ExecutionContext,
        _data_source: &ResourceReference,
        names: &BTreeSet<String>,
    ) -> Result<ParameterTypes, ControlsError> {
        self.calls.lock().unwrap().push(names.clone());
        Ok(names
            .iter()
            .filter_map(|name| self.known.get(name).map(|t| (name.clone(), t.clone())))
            .collect())
    }
}

/// Formats with `Display` and records `(value, bound to control)` per call.
#[derive(Default)]
pub struct RecordingFormatter {
    calls: Mutex<Vec<(Value, bool)>>,
}

impl RecordingFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(Value, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ValueFormatter for RecordingFormatter {
    fn format_single_value(
        &self,
        value: &Value,
        control: Option<&ControlDefinition>,
        _info: Option<&ControlInformation>,
    ) -> Result<String, ControlsError> {
        self.calls
            .lock()
            .unwrap()
            .push((value.clone(), control.is_some()));
        Ok(value.to_string())
    }
}

/// A [`QueryValuesLoader`] wired to mocks, with handles on the engine and audit log.
pub struct TestLoader {
    pub loader: QueryValuesLoader,
    pub engine: Arc<MockEngine>,
    pub audit: Arc<InMemoryAuditContext>,
    services: LoaderServices,
}

impl TestLoader {
    pub fn new(repository: MockRepository, engine: MockEngine) -> Self {
        let engine = Arc::new(engine);
        let audit = Arc::new(InMemoryAuditContext::new());
        let services = LoaderServices {
            repository: Arc::new(repository),
            engine: engine.clone(),
            filter_resolver: Arc::new(QueryParameterScanner::new()),
            type_lookup: Arc::new(MockTypeLookup::new(ParameterTypes::new())),
            formatter: Arc::new(RecordingFormatter::new()),
            audit: audit.clone(),
        };
        Self {
            loader: QueryValuesLoader::new(services.clone(), ControlsConfig::default()),
            engine,
            audit,
            services,
        }
    }

    pub fn report_ds(&self) -> ResourceReference {
        ResourceReference::new("/ds/report")
    }

    pub fn disable_audit(&mut self) {
        let config = ControlsConfig {
            audit_enabled: false,
            ..ControlsConfig::default()
        };
        self.loader = QueryValuesLoader::new(self.services.clone(), config);
    }
}
