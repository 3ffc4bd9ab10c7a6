//! Value formatting for labels.

use crate::config::ControlsConfig;
use crate::control::{ControlDefinition, ControlInformation};
use crate::error::ControlsError;
use crate::value::Value;
use std::fmt::{Display, Write};

/// Renders a raw column value as display text.
pub trait ValueFormatter: Send + Sync {
    /// Format `value`.
    ///
    /// `control` and `info` are only passed when the value comes from the
    /// control's own value column, so control-specific rules (patterns, locale)
    /// apply to that column alone.
    fn format_single_value(
        &self,
        value: &Value,
        control: Option<&ControlDefinition>,
        info: Option<&ControlInformation>,
    ) -> Result<String, ControlsError>;
}

/// [`ValueFormatter`] built on `Display` and `chrono` format patterns.
///
/// Dates and timestamps use the configured patterns, or the control's own
/// `format_pattern` when the value is bound to the control. Lists are joined
/// with `", "`.
#[derive(Debug, Clone)]
pub struct DisplayFormatter {
    date_format: String,
    datetime_format: String,
}

impl DisplayFormatter {
    pub fn new(date_format: impl Into<String>, datetime_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
            datetime_format: datetime_format.into(),
        }
    }

    pub fn from_config(config: &ControlsConfig) -> Self {
        Self::new(config.date_format.clone(), config.datetime_format.clone())
    }
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self::from_config(&ControlsConfig::default())
    }
}

// chrono reports a bad pattern as `fmt::Error`, which `to_string()` would turn into a panic
fn render(item: impl Display, pattern: &str) -> Result<String, ControlsError> {
    let mut out = String::new();
    write!(out, "{item}")
        .map_err(|_| ControlsError::Formatting(format!("invalid format pattern '{pattern}'")))?;
    Ok(out)
}

impl ValueFormatter for DisplayFormatter {
    fn format_single_value(
        &self,
        value: &Value,
        control: Option<&ControlDefinition>,
        info: Option<&ControlInformation>,
    ) -> Result<String, ControlsError> {
        let bound = control.is_some();
        let pattern = info.and_then(|i| i.format_pattern.as_deref()).filter(|_| bound);

        match value {
            Value::Date(d) => {
                let pattern = pattern.unwrap_or(&self.date_format);
                render(d.format(pattern), pattern)
            }
            Value::DateTime(dt) => {
                let pattern = pattern.unwrap_or(&self.datetime_format);
                render(dt.format(pattern), pattern)
            }
            Value::List(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.format_single_value(item, control, info))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(parts.join(", "))
            }
            other => Ok(other.to_string()),
        }
    }
}
