//! Parameter reconciliation.
//!
//! Three sources feed the parameters a control query runs with: the caller's
//! current selections, schema parameters derived from the data source, and the
//! set of names the query text actually references. [`ParameterResolver`]
//! reconciles them; [`TypeResolver`] then completes the type map.

pub mod resolver;
pub mod scanner;
pub mod types;

#[doc(inline)]
pub use resolver::ParameterResolver;
#[doc(inline)]
pub use scanner::QueryParameterScanner;
#[doc(inline)]
pub use types::TypeResolver;
