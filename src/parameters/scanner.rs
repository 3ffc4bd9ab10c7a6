//! Parameter placeholder scanning for report query text.
//!
//! Recognised forms:
//!
//! - `$P{name}`: value parameter
//! - `$P!{name}`: text substitution parameter
//! - `$X{FUNCTION, column, name[, name2]}`: clause functions such as
//!   `$X{IN, country, Country}` or `$X{BETWEEN, amount, Low, High}`

use crate::control::{DataSourceDefinition, DataSourceKind, ParameterValues};
use crate::services::FilterResolver;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static VALUE_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$P!?\{\s*([^}\s]+)\s*\}").expect("valid parameter regex"));

static CLAUSE_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$X\{([^}]*)\}").expect("valid clause regex"));

/// [`FilterResolver`] that reads parameter names straight from query text.
///
/// Schema parameters are only requested for semantic layer data sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParameterScanner;

impl QueryParameterScanner {
    pub fn new() -> Self {
        Self
    }

    /// All parameter names referenced by `query_text`.
    pub fn scan(query_text: &str) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = VALUE_PARAMETER
            .captures_iter(query_text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect();

        for caps in CLAUSE_FUNCTION.captures_iter(query_text) {
            let Some(body) = caps.get(1) else { continue };
            // FUNCTION, column, then one or more parameter names
            names.extend(
                body.as_str()
                    .split(',')
                    .skip(2)
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string),
            );
        }
        names
    }
}

impl FilterResolver for QueryParameterScanner {
    fn parameter_names(&self, query_text: &str, _candidates: &ParameterValues) -> BTreeSet<String> {
        Self::scan(query_text)
    }

    fn needs_data_source_init(&self, data_source: &DataSourceDefinition) -> bool {
        data_source.kind == DataSourceKind::SemanticLayer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_value_and_substitution_parameters() {
        let sql = "select * from orders where country = $P{Country} and $P!{ExtraWhere} and city = $P{ City }";
        assert_eq!(
            QueryParameterScanner::scan(sql),
            names(&["City", "Country", "ExtraWhere"])
        );
    }

    #[test]
    fn test_clause_functions() {
        let sql = "select * from orders where $X{IN, country, Countries} and $X{BETWEEN, amount, Low, High}";
        assert_eq!(
            QueryParameterScanner::scan(sql),
            names(&["Countries", "High", "Low"])
        );
    }

    #[test]
    fn test_duplicates_and_plain_sql() {
        assert_eq!(
            QueryParameterScanner::scan("select $P{A}, $P{A} from t where $X{EQUAL, a, A}"),
            names(&["A"])
        );
        assert!(QueryParameterScanner::scan("select 1 from dual where price > $5").is_empty());
    }

    #[test]
    fn test_needs_init_only_for_semantic_layer() {
        let scanner = QueryParameterScanner::new();
        let domain = DataSourceDefinition {
            uri: "/ds/domain".to_string(),
            kind: DataSourceKind::SemanticLayer,
        };
        let jdbc = DataSourceDefinition {
            uri: "/ds/jdbc".to_string(),
            kind: DataSourceKind::Jdbc,
        };
        assert!(scanner.needs_data_source_init(&domain));
        assert!(!scanner.needs_data_source_init(&jdbc));
    }
}
