//! Label composition from visible columns.

use crate::control::{
    ControlDefinition, ControlInformation, COLUMN_VALUE_SEPARATOR, NULL_SUBSTITUTION_LABEL,
};
use crate::error::ControlsError;
use crate::services::ValueFormatter;
use crate::value::Value;

/// Builds one display label per result row.
///
/// Only the visible column that is also the value column is formatted with the
/// control and its report information bound; `NULL`s are never formatted and
/// render as [`NULL_SUBSTITUTION_LABEL`].
pub struct LabelFormatter<'a> {
    formatter: &'a dyn ValueFormatter,
    control: &'a ControlDefinition,
    info: Option<&'a ControlInformation>,
}

impl<'a> LabelFormatter<'a> {
    pub fn new(
        formatter: &'a dyn ValueFormatter,
        control: &'a ControlDefinition,
        info: Option<&'a ControlInformation>,
    ) -> Self {
        Self {
            formatter,
            control,
            info,
        }
    }

    /// Label for a row's visible-column values, in declared column order.
    ///
    /// # Errors
    ///
    /// Returns [`ControlsError::Formatting`] when the row does not hold exactly
    /// one value per visible column.
    pub fn label(&self, visible_values: &[Value]) -> Result<String, ControlsError> {
        let columns = &self.control.visible_columns;
        if visible_values.len() != columns.len() {
            return Err(ControlsError::Formatting(format!(
                "control {}: row has {} value(s) for {} visible column(s)",
                self.control.name,
                visible_values.len(),
                columns.len()
            )));
        }

        let mut label = String::new();
        for (i, (value, column)) in visible_values
            .iter()
            .zip(columns)
            .enumerate()
        {
            if i > 0 {
                label.push_str(COLUMN_VALUE_SEPARATOR);
            }
            if value.is_null() {
                label.push_str(NULL_SUBSTITUTION_LABEL);
                continue;
            }
            let formatted = if *column == self.control.value_column {
                self.formatter
                    .format_single_value(value, Some(self.control), self.info)?
            } else {
                self.formatter.format_single_value(value, None, None)?
            };
            label.push_str(&formatted);
        }
        Ok(label)
    }
}
