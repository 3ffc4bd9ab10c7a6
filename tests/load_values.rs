//! End-to-end loads through the public API.
//!
//! A small in-memory catalogue stands in for the repository and the engine:
//! a `Country` control with no dependencies and a `City` control whose query
//! filters on the selected country.

use cascade_controls::{
    ControlDefinition, ControlsConfig, ControlsError, DataSourceDefinition, DataSourceKind,
    DisplayFormatter, EngineError, ExecutionContext, InMemoryAuditContext, LoaderServices,
    ParameterTypeLookup, ParameterTypes, ParameterValues, QueryDefinition, QueryEngine,
    QueryParameterScanner, QueryRequest, QueryValuesLoader, RawResultSet, Repository, Resource,
    ResourceReference, Value, ValuesLoader,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

const CITIES: &[(&str, &str)] = &[
    ("CA", "Toronto"),
    ("CA", "Vancouver"),
    ("CA", "Montreal"),
    ("US", "Boston"),
    ("US", "Denver"),
];

struct Catalogue;

impl Repository for Catalogue {
    fn get_resource(&self, reference: &ResourceReference) -> Result<Resource, ControlsError> {
        let query = |sql: &str| {
            Resource::Query(QueryDefinition {
                uri: reference.uri().to_string(),
                sql: sql.to_string(),
                language: "sql".to_string(),
                data_source: None,
            })
        };
        match reference.uri() {
            "/queries/countries" => Ok(query("select code, name from country")),
            "/queries/cities" => Ok(query(
                "select name from city where $X{IN, country_code, Country}",
            )),
            "/datasources/geo" => Ok(Resource::DataSource(DataSourceDefinition {
                uri: reference.uri().to_string(),
                kind: DataSourceKind::Jdbc,
            })),
            other => Err(ControlsError::ResourceNotFound(other.to_string())),
        }
    }
}

struct GeoEngine;

impl QueryEngine for GeoEngine {
    fn execute_query(
        &self,
        _context: &ExecutionContext,
        request: &QueryRequest<'_>,
    ) -> Result<RawResultSet, EngineError> {
        match request.query.uri() {
            "/queries/countries" => Ok([("CA", "Canada"), ("US", "United States")]
                .iter()
                .map(|(code, name)| {
                    (Value::from(*code), vec![Value::from(*code), Value::from(*name)])
                })
                .collect()),
            "/queries/cities" => {
                let selected = match request.parameters.get("Country") {
                    Some(Value::Null) | None => {
                        return Err(EngineError::IllegalArgument("Country is required".into()))
                    }
                    Some(value) => value.to_string(),
                };
                Ok(CITIES
                    .iter()
                    .filter(|(country, _)| *country == selected)
                    .map(|(_, city)| (Value::from(*city), vec![Value::from(*city)]))
                    .collect())
            }
            other => Err(EngineError::Execution(format!("unknown query {other}"))),
        }
    }

    fn schema_parameters(
        &self,
        _data_source: &DataSourceDefinition,
    ) -> Result<ParameterValues, EngineError> {
        Ok(ParameterValues::new())
    }
}

struct NoTypes;

impl ParameterTypeLookup for NoTypes {
    fn parameter_types(
        &self,
        _context: &ExecutionContext,
        _data_source: &ResourceReference,
        _names: &BTreeSet<String>,
    ) -> Result<ParameterTypes, ControlsError> {
        Ok(ParameterTypes::new())
    }
}

fn loader(audit: Arc<InMemoryAuditContext>) -> QueryValuesLoader {
    let services = LoaderServices {
        repository: Arc::new(Catalogue),
        engine: Arc::new(GeoEngine),
        filter_resolver: Arc::new(QueryParameterScanner::new()),
        type_lookup: Arc::new(NoTypes),
        formatter: Arc::new(DisplayFormatter::default()),
        audit,
    };
    QueryValuesLoader::new(services, ControlsConfig::default())
}

fn country_control() -> ControlDefinition {
    ControlDefinition::new(
        "Country",
        "/reports/geo/Country",
        ResourceReference::new("/queries/countries"),
        "code",
        vec!["code".to_string(), "name".to_string()],
    )
}

fn city_control() -> ControlDefinition {
    ControlDefinition::new(
        "City",
        "/reports/geo/City",
        ResourceReference::new("/queries/cities"),
        "name",
        vec!["name".to_string()],
    )
}

fn geo() -> ResourceReference {
    ResourceReference::new("/datasources/geo")
}

#[test]
fn test_master_control_lists_all_values() {
    let audit = Arc::new(InMemoryAuditContext::new());
    let loader = loader(audit.clone());
    let mut parameters = ParameterValues::new();

    let items = loader
        .load_values(
            &country_control().mandatory(true),
            &geo(),
            &mut parameters,
            &ParameterTypes::new(),
            None,
            true,
        )
        .unwrap()
        .unwrap();

    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["CA | Canada", "US | United States"]);
    assert_eq!(parameters["Country_totalCount"], Value::Int(2));
    assert_eq!(audit.closed_events().len(), 1);
}

#[test]
fn test_dependent_control_follows_master_selection() {
    let loader = loader(Arc::new(InMemoryAuditContext::new()));
    let mut parameters = ParameterValues::new();
    parameters.insert("Country".to_string(), Value::from("CA"));
    parameters.insert("City_criteria".to_string(), Value::from("ONT"));
    parameters.insert("City_limit".to_string(), Value::Int(1));

    let items = loader
        .load_values(
            &city_control(),
            &geo(),
            &mut parameters,
            &ParameterTypes::new(),
            None,
            true,
        )
        .unwrap()
        .unwrap();

    // "---" first, then the first match; Toronto and Montreal both match "ont"
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["---"]);
    assert_eq!(parameters["City_totalCount"], Value::Int(2));

    parameters.insert("City_offset".to_string(), Value::Int(1));
    let items = loader
        .load_values(
            &city_control(),
            &geo(),
            &mut parameters,
            &ParameterTypes::new(),
            None,
            true,
        )
        .unwrap()
        .unwrap();
    assert_eq!(items[0].label, "Toronto");
}

#[test]
fn test_dependent_control_without_selection_has_no_values() {
    let audit = Arc::new(InMemoryAuditContext::new());
    let loader = loader(audit.clone());
    let mut parameters = ParameterValues::new();

    let items = loader
        .load_values(
            &city_control(),
            &geo(),
            &mut parameters,
            &ParameterTypes::new(),
            None,
            true,
        )
        .unwrap();

    assert!(items.is_none());
    assert!(!parameters.contains_key("City_totalCount"));
    assert_eq!(audit.open_count(), 0);
}

#[test]
fn test_master_dependencies_of_dependent_control() {
    let loader = loader(Arc::new(InMemoryAuditContext::new()));

    let city: BTreeSet<String> = loader.master_dependencies(&city_control(), &geo()).unwrap();
    assert_eq!(city, BTreeSet::from(["Country".to_string()]));

    let country = loader.master_dependencies(&country_control(), &geo()).unwrap();
    assert!(country.is_empty());
}

#[test]
fn test_limit_above_configured_maximum_is_rejected() {
    let mut config = ControlsConfig::default();
    config.max_limit = Some(10);
    let services = LoaderServices {
        repository: Arc::new(Catalogue),
        engine: Arc::new(GeoEngine),
        filter_resolver: Arc::new(QueryParameterScanner::new()),
        type_lookup: Arc::new(NoTypes),
        formatter: Arc::new(DisplayFormatter::default()),
        audit: Arc::new(InMemoryAuditContext::new()),
    };
    let loader = QueryValuesLoader::new(services, config);
    let mut parameters: ParameterValues =
        HashMap::from([("Country_limit".to_string(), Value::Int(50))]);

    let result = loader.load_values(
        &country_control(),
        &geo(),
        &mut parameters,
        &ParameterTypes::new(),
        None,
        false,
    );
    match result {
        Err(ControlsError::Validation(errors)) => {
            assert!(errors.contains_key("Country_limit"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}
