//! Dispatch module
//!
//! Bridges HTTP requests to the external command:
//! - `validator`: checks request bodies against the declared schema
//! - `translator`: renders a body as command-line flags
//! - `invoker`: runs the command and captures its output
//! - `router`: the handler table and per-request pipeline

pub mod invoker;
pub mod router;
pub mod translator;
pub mod validator;

pub use router::{handle_request, Dispatcher};
