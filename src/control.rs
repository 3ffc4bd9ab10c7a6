//! Input control data model.
//!
//! Everything here is built fresh for a single load and dropped when it returns.
//! Control definitions and query definitions are read-only inputs; the only
//! mutable structure is the [`RawResultSet`], which the windowing step extends
//! with the "nothing selected" row.

use crate::value::{ParameterType, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Marker value of the synthetic "nothing selected" row.
pub const NOTHING_SUBSTITUTION_VALUE: &str = "~NOTHING~";

/// Label of the synthetic "nothing selected" row.
pub const NOTHING_SUBSTITUTION_LABEL: &str = "---";

/// Label used in place of a `NULL` visible column.
pub const NULL_SUBSTITUTION_LABEL: &str = "[Null]";

/// Separator placed between visible column values in a label.
pub const COLUMN_VALUE_SEPARATOR: &str = " | ";

/// Parameter values keyed by parameter name. A [`Value::Null`] entry means
/// "needed but unselected", which is different from the key being absent.
pub type ParameterValues = HashMap<String, Value>;

/// Declared parameter types keyed by parameter name.
pub type ParameterTypes = HashMap<String, ParameterType>;

/// Query rows keyed by their value-column value, holding the visible-column
/// values in declared order. Iteration order is query result order.
pub type RawResultSet = IndexMap<Value, Vec<Value>>;

/// Opaque pointer to a named repository resource (query or data source).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceReference(String);

impl ResourceReference {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Repository URI of the referenced resource
    pub fn uri(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceReference {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

/// Definition of a query-backed input control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlDefinition {
    /// Control (and parameter) name
    pub name: String,
    /// Repository URI of the control itself
    pub uri: String,
    /// Query producing the candidate values
    pub query: ResourceReference,
    /// Result column holding each item's value
    pub value_column: String,
    /// Result columns composing each item's label, in display order
    pub visible_columns: Vec<String>,
    pub mandatory: bool,
}

impl ControlDefinition {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        query: ResourceReference,
        value_column: impl Into<String>,
        visible_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            query,
            value_column: value_column.into(),
            visible_columns,
            mandatory: false,
        }
    }

    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }
}

/// Report-level information about a control, handed to value formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControlInformation {
    pub parameter_name: String,
    pub prompt_label: Option<String>,
    pub value_type: Option<ParameterType>,
    pub default_value: Option<Value>,
    /// Formatting pattern for the value column (dates, numbers)
    pub format_pattern: Option<String>,
}

/// Query resource: query text plus an optional own data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefinition {
    pub uri: String,
    pub sql: String,
    pub language: String,
    /// Overrides the report data source when set
    pub data_source: Option<ResourceReference>,
}

/// Broad family of a data source; decides whether schema parameters are needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSourceKind {
    Jdbc,
    Jndi,
    Bean,
    /// Semantic layer (domain) data source; queries need the schema in their parameters
    SemanticLayer,
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceDefinition {
    pub uri: String,
    pub kind: DataSourceKind,
}

/// A resolved repository resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Query(QueryDefinition),
    DataSource(DataSourceDefinition),
    Other { uri: String, resource_type: String },
}

impl Resource {
    pub fn uri(&self) -> &str {
        match self {
            Resource::Query(q) => &q.uri,
            Resource::DataSource(ds) => &ds.uri,
            Resource::Other { uri, .. } => uri,
        }
    }

    /// Short resource type name, used in error messages
    pub fn type_name(&self) -> &str {
        match self {
            Resource::Query(_) => "query",
            Resource::DataSource(_) => "data source",
            Resource::Other { resource_type, .. } => resource_type,
        }
    }
}

/// Runtime execution context handed to the engine and type lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub locale: String,
    pub time_zone: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            locale: "en_US".to_string(),
            time_zone: "UTC".to_string(),
        }
    }
}

/// One selectable entry of a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueItem {
    pub label: String,
    pub value: Value,
}

impl ValueItem {
    pub fn new(label: impl Into<String>, value: Value) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    /// The "nothing selected" item.
    pub fn nothing() -> Self {
        Self::new(
            NOTHING_SUBSTITUTION_LABEL,
            Value::from(NOTHING_SUBSTITUTION_VALUE),
        )
    }

    pub fn is_nothing(&self) -> bool {
        self.value.as_str() == Some(NOTHING_SUBSTITUTION_VALUE)
    }
}

/// Windowed items plus the number of matches before paging.
///
/// `items` is `None` when the control has no candidate values at all, which is
/// different from `Some(vec![])` (values exist but none fall in the window or
/// match the criteria).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValuesPage {
    pub items: Option<Vec<ValueItem>>,
    pub total_count: Option<usize>,
}
