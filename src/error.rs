//! Error types for the keep-alive agent.
//!
//! Credential and client construction errors are fatal and only occur at
//! startup. Everything else is produced by a single ping or earnings cycle,
//! logged by the caller, and never ends the process.

use wreq::StatusCode;

/// Errors that can occur while obtaining a credential or talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// No token could be obtained from the configured source.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The token contains bytes that cannot be sent in an HTTP header.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// A network-level failure during a request.
    #[error("transport error: {0}")]
    Transport(#[from] wreq::Error),

    /// The API answered with something other than 200.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// The API answered 200 but the body is not what we expected.
    #[error("malformed response ({reason}): {body}")]
    MalformedResponse { body: String, reason: String },
}

/// Convenience type alias for agent results.
pub type Result<T> = std::result::Result<T, AgentError>;
