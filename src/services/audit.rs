//! Audit event lifecycle.
//!
//! Events are opened, decorated with properties and closed. Opening an event of
//! a type the caller already has open joins the open one (and keeps its
//! resource URI).

use crate::value::Value;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::thread::{self, ThreadId};
use uuid::Uuid;

/// Audit lifecycle failure. Never aborts the audited operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditError(pub String);

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Audit error: {}", self.0)
    }
}

impl std::error::Error for AuditError {}

/// A named property attached to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditProperty {
    pub property_type: String,
    pub name: String,
    pub value: String,
}

/// An audit event, open or closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub id: Uuid,
    pub event_type: String,
    pub resource_uri: Option<String>,
    pub properties: Vec<AuditProperty>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl AuditEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            resource_uri: None,
            properties: Vec::new(),
            opened_at: Utc::now(),
            closed_at: None,
        }
    }
}

/// Sink for audit events.
pub trait AuditContext: Send + Sync {
    /// Open an event of `event_type`, or join the one already open.
    fn create_event(&self, event_type: &str) -> Result<AuditEvent, AuditError>;

    /// Attach a `(name, value)` property of `property_type` to `event`.
    fn add_property(
        &self,
        event: &mut AuditEvent,
        property_type: &str,
        name: &str,
        value: &Value,
    ) -> Result<(), AuditError> {
        event.properties.push(AuditProperty {
            property_type: property_type.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    /// Close `event`.
    fn close_event(&self, event: AuditEvent) -> Result<(), AuditError>;
}

/// [`AuditContext`] keeping events in memory.
///
/// Open events belong to the thread that opened them. Creating an event of a
/// type the current thread already has open joins that event; the join is
/// undone by the matching close, and only the outermost close finishes the
/// event. Loads on different threads always get separate events.
///
/// Closed events are retained in close order and also logged at info level.
#[derive(Debug, Default)]
pub struct InMemoryAuditContext {
    open: Mutex<HashMap<Uuid, OpenEvent>>,
    closed: Mutex<Vec<AuditEvent>>,
}

#[derive(Debug)]
struct OpenEvent {
    event: AuditEvent,
    owner: ThreadId,
    depth: usize,
}

impl InMemoryAuditContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of closed events
    pub fn closed_events(&self) -> Vec<AuditEvent> {
        self.closed
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of events currently open
    pub fn open_count(&self) -> usize {
        self.open.lock().map(|open| open.len()).unwrap_or(0)
    }
}

fn poisoned<T>(_: T) -> AuditError {
    AuditError("audit context lock poisoned".to_string())
}

impl AuditContext for InMemoryAuditContext {
    fn create_event(&self, event_type: &str) -> Result<AuditEvent, AuditError> {
        let owner = thread::current().id();
        let mut open = self.open.lock().map_err(poisoned)?;

        if let Some(joined) = open
            .values_mut()
            .find(|o| o.owner == owner && o.event.event_type == event_type)
        {
            joined.depth += 1;
            return Ok(joined.event.clone());
        }

        let event = AuditEvent::new(event_type);
        open.insert(
            event.id,
            OpenEvent {
                event: event.clone(),
                owner,
                depth: 1,
            },
        );
        Ok(event)
    }

    fn close_event(&self, mut event: AuditEvent) -> Result<(), AuditError> {
        let mut open = self.open.lock().map_err(poisoned)?;
        let Some(entry) = open.get_mut(&event.id) else {
            return Err(AuditError(format!(
                "no open '{}' event {} to close",
                event.event_type, event.id
            )));
        };
        entry.depth -= 1;
        if entry.depth > 0 {
            // Inner close of a joined event: keep what it added for the outer one
            entry.event = event;
            return Ok(());
        }
        open.remove(&event.id);
        drop(open);

        event.closed_at = Some(Utc::now());
        log::info!(
            "audit event {} ({}) closed: resource={} properties={}",
            event.id,
            event.event_type,
            event.resource_uri.as_deref().unwrap_or("-"),
            event.properties.len()
        );
        self.closed.lock().map_err(poisoned)?.push(event);
        Ok(())
    }
}
