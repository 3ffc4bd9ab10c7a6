//! # Cascade Controls
//!
//! Candidate-value loading for cascading, query-backed report input controls.
//!
//! A control's values come from a repository query whose parameters are the
//! selections made in other controls. [`QueryValuesLoader`] reconciles those
//! parameters, runs the query, and returns a filtered page of labelled items
//! together with the total number of matches.
//!
//! Repository access, query execution and formatting are pluggable, see
//! [`services`].

pub mod config;
pub mod control;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod parameters;
pub mod services;
pub mod value;

#[cfg(test)]
mod test_helpers;

pub use config::ControlsConfig;
pub use control::{
    ControlDefinition, ControlInformation, DataSourceDefinition, DataSourceKind, ExecutionContext,
    ParameterTypes, ParameterValues, QueryDefinition, RawResultSet, Resource, ResourceReference,
    ValueItem, ValuesPage,
};
pub use error::{ControlsError, EngineError};
pub use loader::window::WindowSpec;
pub use loader::{LoaderServices, QueryValuesLoader, ValuesLoader};
pub use parameters::{ParameterResolver, QueryParameterScanner, TypeResolver};
pub use services::{
    AuditContext, DisplayFormatter, FilterResolver, InMemoryAuditContext, ParameterTypeLookup,
    QueryEngine, QueryRequest, Repository, ValueFormatter,
};
pub use value::{ParameterType, Value};
