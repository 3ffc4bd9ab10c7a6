//! Filtering and paging of query results.
//!
//! A load produces two numbers of interest: the items on the requested page and
//! the total number of items matching the search criteria. The total is counted
//! over the whole result set, before any paging, so the UI can report "N results"
//! independently of the page it shows.
//!
//! The window itself is read from control-scoped caller parameters
//! (`<control>_limit`, `<control>_offset`, `<control>_criteria`); the total count
//! is reported back under `<control>_totalCount`.

use super::label::LabelFormatter;
use crate::control::{
    ControlDefinition, ParameterValues, RawResultSet, ValueItem, NOTHING_SUBSTITUTION_LABEL,
    NOTHING_SUBSTITUTION_VALUE,
};
use crate::error::ControlsError;
use crate::value::Value;
use std::collections::BTreeMap;

pub const LIMIT_SUFFIX: &str = "_limit";
pub const OFFSET_SUFFIX: &str = "_offset";
pub const CRITERIA_SUFFIX: &str = "_criteria";
pub const TOTAL_COUNT_SUFFIX: &str = "_totalCount";

pub fn limit_key(control_name: &str) -> String {
    format!("{control_name}{LIMIT_SUFFIX}")
}

pub fn offset_key(control_name: &str) -> String {
    format!("{control_name}{OFFSET_SUFFIX}")
}

pub fn criteria_key(control_name: &str) -> String {
    format!("{control_name}{CRITERIA_SUFFIX}")
}

pub fn total_count_key(control_name: &str) -> String {
    format!("{control_name}{TOTAL_COUNT_SUFFIX}")
}

/// Requested page and search filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSpec {
    /// Page size; 0 means unbounded
    pub limit: usize,
    pub offset: usize,
    /// Case-insensitive substring filter on labels; never empty when set
    pub criteria: Option<String>,
    criteria_lower: Option<String>,
}

impl WindowSpec {
    pub fn new(limit: usize, offset: usize, criteria: Option<&str>) -> Self {
        let criteria = criteria.filter(|c| !c.is_empty()).map(str::to_string);
        Self {
            limit,
            offset,
            criteria_lower: criteria.as_ref().map(|c| c.to_lowercase()),
            criteria,
        }
    }

    /// Read the window for `control` from caller parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ControlsError::Validation`] listing every invalid parameter
    /// (limit and offset are both checked before failing).
    pub fn from_parameters(
        control: &ControlDefinition,
        parameters: &ParameterValues,
        max_limit: Option<usize>,
    ) -> Result<Self, ControlsError> {
        let mut errors = BTreeMap::new();

        let limit_key = limit_key(&control.name);
        let limit = read_count(parameters, &limit_key, &mut errors);
        if let Some(max) = max_limit {
            if limit > max {
                errors.insert(limit_key, format!("must not exceed {max}, got {limit}"));
            }
        }
        let offset = read_count(parameters, &offset_key(&control.name), &mut errors);

        if !errors.is_empty() {
            return Err(ControlsError::Validation(errors));
        }

        let criteria = match parameters.get(&criteria_key(&control.name)) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Ok(Self::new(limit, offset, criteria.as_deref()))
    }

    /// Upper bound of the page within a list of `size` items.
    pub fn total_limit(&self, size: usize) -> usize {
        if self.limit == 0 {
            size
        } else {
            self.offset.saturating_add(self.limit).min(size)
        }
    }

    /// Whether `label` passes the criteria (always true without criteria).
    pub fn matches(&self, label: &str) -> bool {
        match &self.criteria_lower {
            Some(needle) => label.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }

    /// Cut the page out of `items`. An offset past the end yields an empty page.
    pub fn slice(&self, items: Vec<ValueItem>) -> Vec<ValueItem> {
        let len = items.len();
        let to = self.total_limit(len);
        let from = self.offset.min(len);
        items.into_iter().skip(from).take(to - from).collect()
    }
}

fn read_count(
    parameters: &ParameterValues,
    key: &str,
    errors: &mut BTreeMap<String, String>,
) -> usize {
    let value = match parameters.get(key) {
        None | Some(Value::Null) => return 0,
        Some(Value::String(s)) if s.trim().is_empty() => return 0,
        Some(value) => value,
    };
    match value.as_i64() {
        Some(n) if n >= 0 => usize::try_from(n).unwrap_or(usize::MAX),
        Some(n) => {
            errors.insert(key.to_string(), format!("must be a non-negative integer, got {n}"));
            0
        }
        None => {
            errors.insert(key.to_string(), format!("must be an integer, got '{value}'"));
            0
        }
    }
}

fn nothing_value() -> Value {
    Value::from(NOTHING_SUBSTITUTION_VALUE)
}

/// Turns a raw result set into the requested page of [`ValueItem`]s.
pub struct ResultWindower<'a> {
    labels: LabelFormatter<'a>,
}

impl<'a> ResultWindower<'a> {
    pub fn new(labels: LabelFormatter<'a>) -> Self {
        Self { labels }
    }

    /// Put the "nothing selected" row first in `results`.
    pub fn insert_nothing_row(results: &mut RawResultSet) {
        results.shift_insert(
            0,
            nothing_value(),
            vec![Value::from(NOTHING_SUBSTITUTION_LABEL)],
        );
    }

    fn row_label(&self, value: &Value, row: &[Value]) -> Result<String, ControlsError> {
        if value.as_str() == Some(NOTHING_SUBSTITUTION_VALUE) {
            Ok(NOTHING_SUBSTITUTION_LABEL.to_string())
        } else {
            self.labels.label(row)
        }
    }

    /// Number of rows matching the criteria, the nothing row included.
    pub fn total_count(
        &self,
        results: &RawResultSet,
        window: &WindowSpec,
    ) -> Result<usize, ControlsError> {
        if window.criteria.is_none() {
            return Ok(results.len());
        }
        let mut count = 0;
        for (value, row) in results {
            if window.matches(&self.row_label(value, row)?) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Matching items up to the end of the requested page, before slicing.
    ///
    /// The nothing row is added first without being matched against the
    /// criteria. Iteration stops once the list reaches `offset + limit` items.
    pub fn build_list(
        &self,
        results: &RawResultSet,
        window: &WindowSpec,
    ) -> Result<Vec<ValueItem>, ControlsError> {
        let total_limit = window.total_limit(results.len());
        let nothing = nothing_value();
        let mut items = Vec::with_capacity(total_limit);

        if results.contains_key(&nothing) {
            items.push(ValueItem::nothing());
        }
        for (value, row) in results {
            if *value == nothing {
                continue;
            }
            if items.len() >= total_limit {
                break;
            }
            let label = self.labels.label(row)?;
            if window.matches(&label) {
                items.push(ValueItem::new(label, value.clone().normalized()));
            }
        }
        Ok(items)
    }

    /// Page of items plus the total number of matches.
    pub fn window(
        &self,
        results: &RawResultSet,
        window: &WindowSpec,
    ) -> Result<(Vec<ValueItem>, usize), ControlsError> {
        let total_count = self.total_count(results, window)?;
        let items = self.build_list(results, window)?;
        Ok((window.slice(items), total_count))
    }
}
