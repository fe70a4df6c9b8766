//! One error type for every fallible call in the crate.
//!
//! # Design
//! Failures fall into three groups. Server answers that are not 2xx become
//! `NotFound` (404) or `HttpError`, which keeps the status and raw body.
//! Failures before a response exists are `Transport`, or
//! `SerializationError` when a payload cannot be encoded. Local
//! preconditions are `IdNotSet` for an entity that has no id yet and
//! `MissingField` for a key a request needs but the entity's JSON did not
//! carry. Both of those are raised before anything is sent.
//!
//! An action whose response echoes a different id is `Ok(false)`, not an
//! error.

/// Errors returned by the request handler and entity operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404: the requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response (connection, TLS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into JSON.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// An operation that addresses the entity by id was called before the id
    /// was known.
    #[error("id not set")]
    IdNotSet,

    /// A key the operation depends on was absent, either from a server
    /// response or from the JSON the entity was built from.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// No path template is registered under this name.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// Configuration could not be assembled.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
