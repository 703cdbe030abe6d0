//! Domain-level error types and the [`Outcome`] alias.
//!
//! Every fallible operation in the synchronisation core returns an
//! [`Outcome`]. Port adapters raise their own error enums; services map them
//! into [`Error`] at the point of occurrence and pass them up unmodified.

use serde::{Deserialize, Serialize};

/// Result of any fallible synchronisation operation.
///
/// `Ok` carries the produced value, `Err` carries the [`Error`] describing the
/// failure. There is no third state.
pub type Outcome<T> = Result<T, Error>;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A network-gated write was attempted while the session is offline.
    NetworkUnavailable,
    /// The authoritative backend rejected the request or timed out.
    RemoteFailure,
    /// The local cache could not be read or written.
    LocalFailure,
    /// One side of a dual-write committed and the other did not.
    PartialCommit,
    /// Card payload encryption or decryption failed.
    CipherFailure,
    /// Review images could not be uploaded.
    UploadFailure,
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The requested record does not exist.
    NotFound,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

impl ErrorCode {
    /// Snake-case identifier used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkUnavailable => "network_unavailable",
            Self::RemoteFailure => "remote_failure",
            Self::LocalFailure => "local_failure",
            Self::PartialCommit => "partial_commit",
            Self::CipherFailure => "cipher_failure",
            Self::UploadFailure => "upload_failure",
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "not_found",
            Self::InternalError => "internal_error",
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            Self::NetworkUnavailable => "network unavailable",
            Self::RemoteFailure => "remote store failure",
            Self::LocalFailure => "local store failure",
            Self::PartialCommit => "dual-write partially committed",
            Self::CipherFailure => "card cipher failure",
            Self::UploadFailure => "image upload failure",
            Self::InvalidRequest => "invalid request",
            Self::NotFound => "not found",
            Self::InternalError => "internal error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error payload: a message plus an optional wrapped cause.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use storefront::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "missing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    cause: Option<Box<Error>>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    /// The message was empty or only whitespace.
    EmptyMessage,
}

impl std::fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

impl Error {
    /// Create a new error.
    ///
    /// Blank messages are replaced with a generic description of `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.fallback_message().to_owned(),
            cause: None,
        })
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            cause: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message surfaced to the presentation layer.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Wrapped cause, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// Attach the error that triggered this one.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::{Error, ErrorCode};
    ///
    /// let err = Error::partial_commit("write failed")
    ///     .with_cause(Error::remote_failure("timeout"));
    /// assert_eq!(err.cause().map(Error::code), Some(ErrorCode::RemoteFailure));
    /// ```
    pub fn with_cause(mut self, cause: Error) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Convenience constructor for [`ErrorCode::NetworkUnavailable`].
    pub fn network_unavailable() -> Self {
        Self::new(ErrorCode::NetworkUnavailable, "network unavailable")
    }

    /// Convenience constructor for [`ErrorCode::RemoteFailure`].
    pub fn remote_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RemoteFailure, message)
    }

    /// Convenience constructor for [`ErrorCode::LocalFailure`].
    pub fn local_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::LocalFailure, message)
    }

    /// Convenience constructor for [`ErrorCode::PartialCommit`].
    pub fn partial_commit(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PartialCommit, message)
    }

    /// Convenience constructor for [`ErrorCode::CipherFailure`].
    pub fn cipher_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CipherFailure, message)
    }

    /// Convenience constructor for [`ErrorCode::UploadFailure`].
    pub fn upload_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UploadFailure, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Compose independent sub-outcomes into one.
///
/// The result is `Ok` only when every sub-outcome succeeded; otherwise it is
/// the first failure in iteration order. Callers that care about completion
/// order must yield outcomes in the order they were observed.
///
/// # Examples
/// ```
/// use storefront::domain::{Error, ErrorCode, combine_all};
///
/// let outcomes = vec![Ok(()), Err(Error::local_failure("disk full")), Err(Error::remote_failure("timeout"))];
/// let err = combine_all(outcomes).expect_err("one sub-outcome failed");
/// assert_eq!(err.code(), ErrorCode::LocalFailure);
/// ```
pub fn combine_all<I>(outcomes: I) -> Outcome<()>
where
    I: IntoIterator<Item = Outcome<()>>,
{
    match first_failure(outcomes) {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Return the first error among `outcomes`, if any.
pub fn first_failure<T, I>(outcomes: I) -> Option<Error>
where
    I: IntoIterator<Item = Outcome<T>>,
{
    outcomes.into_iter().find_map(Result::err)
}
