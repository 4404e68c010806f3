//! Observability — structured access logging
//!
//! Logging is advisory only: nothing here may affect the response sent
//! to the client.

pub mod access_log;

pub use access_log::AccessLog;
