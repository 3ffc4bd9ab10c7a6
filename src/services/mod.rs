//! Collaborators consumed by the loader.
//!
//! The loader owns none of the heavy lifting: resolving repository references,
//! running queries, naming parameters, looking up their types, formatting
//! values and recording audit events all happen behind these traits. Every
//! trait is object-safe and `Send + Sync` so a single loader can be shared
//! between request threads.

pub mod audit;
pub mod engine;
pub mod filter;
pub mod formatter;
pub mod repository;
pub mod types;

#[doc(inline)]
pub use audit::{AuditContext, AuditError, AuditEvent, AuditProperty, InMemoryAuditContext};
#[doc(inline)]
pub use engine::{QueryEngine, QueryRequest};
#[doc(inline)]
pub use filter::FilterResolver;
#[doc(inline)]
pub use formatter::{DisplayFormatter, ValueFormatter};
#[doc(inline)]
pub use repository::Repository;
#[doc(inline)]
pub use types::ParameterTypeLookup;
