//! Pieces shared by the binary and the HTTP crate: response types and
//! logging setup.

pub mod types;
pub mod utils;
