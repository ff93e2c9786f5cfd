//! Error types for the order lookup service.
//!
//! This module defines the central `Error` enum, which captures every failure
//! the service can report. It implements `From<Error>` for `tonic::Status` so
//! each failure class reaches the caller with its own status code instead of a
//! blanket internal error.
//!
//! ## Error Cases
//! - `Configuration`: Required configuration is missing or invalid.
//! - `Unavailable`: The database could not be reached or no connection could
//!   be checked out in time.
//! - `Query`: The database rejected the statement or a row failed to decode.
//! - `Timeout`: The call ran past its deadline.
//! - `ServiceShutdown`: A request arrived while the service was shutting down.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the order lookup service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Required configuration is missing or malformed.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// The database is unreachable (I/O, TLS, pool exhausted or closed).
    #[error("Database unavailable: {context}")]
    Unavailable { context: String },

    /// The statement failed (SQL error, schema conflict, row decode).
    #[error("Query error: {context}")]
    Query { context: String },

    /// The call exceeded its deadline.
    #[error("Request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Configuration { reason } => {
                Status::failed_precondition(format!("Configuration error: {reason}"))
            }
            Error::Unavailable { context } => {
                Status::unavailable(format!("Database unavailable: {context}"))
            }
            Error::Query { context } => Status::internal(format!("Query error: {context}")),
            Error::Timeout { elapsed_ms } => {
                Status::deadline_exceeded(format!("Request timed out after {elapsed_ms}ms"))
            }
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}
