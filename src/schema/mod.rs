//! Schema module
//!
//! Holds the routing document once it has been parsed: which routes exist,
//! which methods each route accepts, and the typed parameters of each.

mod store;
mod value;

pub use store::{ParameterSchema, RouteSpec, SchemaStore};
pub use value::{TypedValue, ValueType};
