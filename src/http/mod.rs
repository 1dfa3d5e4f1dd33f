//! HTTP protocol layer module
//!
//! Response builders shared by the dispatcher, decoupled from request logic.

pub mod response;

pub use response::{build_404_response, build_error_response, build_json_response};
