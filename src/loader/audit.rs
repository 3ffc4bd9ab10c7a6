//! Audit scope around a value load.
//!
//! The scope opens an `input-controls-query` event when created and closes it
//! when dropped, so every exit path of a load (errors and empty results
//! included) closes the event. Audit failures are logged and otherwise ignored.

use crate::control::ParameterValues;
use crate::services::{AuditContext, AuditEvent};

pub const INPUT_CONTROLS_QUERY: &str = "input-controls-query";

/// Property type under which caller parameters are recorded.
pub const INPUT_CONTROL_PARAM: &str = "inputControlParam";

pub struct AuditScope<'a> {
    context: Option<&'a dyn AuditContext>,
    event: Option<AuditEvent>,
}

impl<'a> AuditScope<'a> {
    /// Open (or join) the event for a load of the control at `resource_uri`.
    pub fn open(
        context: &'a dyn AuditContext,
        resource_uri: &str,
        parameters: &ParameterValues,
    ) -> Self {
        let mut event = match context.create_event(INPUT_CONTROLS_QUERY) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("could not open audit event for {resource_uri}: {e}");
                return Self {
                    context: Some(context),
                    event: None,
                };
            }
        };

        if event.resource_uri.is_none() {
            event.resource_uri = Some(resource_uri.to_string());
        }

        let mut names: Vec<&String> = parameters.keys().collect();
        names.sort();
        for name in names {
            let value = &parameters[name];
            if let Err(e) = context.add_property(&mut event, INPUT_CONTROL_PARAM, name, value) {
                log::warn!("could not record audit property {name}: {e}");
            }
        }

        Self {
            context: Some(context),
            event: Some(event),
        }
    }

    /// A scope that records nothing.
    pub fn disabled() -> Self {
        Self {
            context: None,
            event: None,
        }
    }
}

impl Drop for AuditScope<'_> {
    fn drop(&mut self) {
        if let (Some(context), Some(event)) = (self.context, self.event.take()) {
            if let Err(e) = context.close_event(event) {
                log::warn!("could not close audit event: {e}");
            }
        }
    }
}
