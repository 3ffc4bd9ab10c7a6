//! Error types for value loading.
//!
//! [`EngineError`] is what a [`crate::QueryEngine`] reports; [`ControlsError`] is
//! what callers of the loader see. Schema drift (`MissingDataSourceFields`,
//! `IllegalArgument`) never reaches callers of a load: it is converted to an
//! empty result by the execution adapter.

use std::collections::BTreeMap;
use std::fmt;

/// Failure reported by the query engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A field the query relies on no longer exists in the data source
    MissingDataSourceFields(Vec<String>),
    /// The engine rejected an argument (typically a parameter no longer valid for the schema)
    IllegalArgument(String),
    /// Any other execution failure
    Execution(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MissingDataSourceFields(fields) => {
                write!(f, "Fields missing from data source: {}", fields.join(", "))
            }
            EngineError::IllegalArgument(msg) => write!(f, "Illegal argument: {msg}"),
            EngineError::Execution(msg) => write!(f, "Query execution failed: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Errors surfaced by [`crate::ValuesLoader`] operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlsError {
    /// A repository reference could not be resolved
    ResourceNotFound(String),
    /// A reference resolved to a resource of the wrong type
    UnexpectedResource {
        uri: String,
        expected: &'static str,
        found: String,
    },
    /// Window parameters out of range, keyed by parameter name
    Validation(BTreeMap<String, String>),
    /// Query engine failure other than schema drift
    Engine(EngineError),
    /// A value could not be rendered as a label
    Formatting(String),
    /// Parameter types could not be determined
    TypeLookup(String),
}

impl fmt::Display for ControlsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlsError::ResourceNotFound(uri) => write!(f, "Resource not found: {uri}"),
            ControlsError::UnexpectedResource {
                uri,
                expected,
                found,
            } => write!(f, "Resource '{uri}' is a {found}, expected a {expected}"),
            ControlsError::Validation(errors) => {
                write!(f, "Invalid input control parameters: ")?;
                for (i, (name, msg)) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{name}: {msg}")?;
                }
                Ok(())
            }
            ControlsError::Engine(e) => write!(f, "{e}"),
            ControlsError::Formatting(msg) => write!(f, "Formatting error: {msg}"),
            ControlsError::TypeLookup(msg) => write!(f, "Parameter type lookup failed: {msg}"),
        }
    }
}

impl std::error::Error for ControlsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControlsError::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for ControlsError {
    fn from(err: EngineError) -> Self {
        ControlsError::Engine(err)
    }
}
