//! Domain-level error types.
//!
//! These errors are transport agnostic. Store and cache adapters produce
//! them; any HTTP layer built on top maps them to responses through
//! [`DomainError::http_status_hint`] and the stable [`ErrorCode`] strings.

use serde::Serialize;
use serde_json::Value;

use super::attribute::CodecError;

/// Stable machine-readable error code.
///
/// The serialised names are a wire contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    BadRequest,
    Unauthorized,
    Forbidden,
    Conflict,
    InternalServerError,
    ValidationError,
}

impl ErrorCode {
    /// Wire representation of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
        }
    }

    /// HTTP status an inbound adapter should use for this code.
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::BadRequest | Self::ValidationError => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::Conflict => 409,
            Self::InternalServerError => 500,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure category used for control flow by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The addressed record or table does not exist.
    NotFound,
    /// A conditional write found conflicting state.
    Conflict,
    /// The store throttled the request; safe to retry with backoff.
    RateLimited,
    /// The request was rejected by the store.
    InvalidInput,
    /// Entity-level validation failed before reaching the store.
    Validation,
    /// Credentials were missing or wrong.
    Unauthorized,
    /// The caller is not allowed to perform the action.
    Forbidden,
    /// Required endpoint or credential settings are absent. Fatal at startup.
    Configuration,
    /// A value could not be expressed as an attribute value.
    UnsupportedType,
    /// A stored attribute value violated the wire format.
    MalformedWireValue,
}

impl ErrorKind {
    /// Machine code reported for this kind.
    pub fn code(self) -> ErrorCode {
        match self {
            Self::NotFound => ErrorCode::NotFound,
            Self::Conflict => ErrorCode::Conflict,
            Self::RateLimited | Self::InvalidInput => ErrorCode::BadRequest,
            Self::Validation => ErrorCode::ValidationError,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::Forbidden => ErrorCode::Forbidden,
            Self::Configuration | Self::UnsupportedType | Self::MalformedWireValue => {
                ErrorCode::InternalServerError
            }
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited)
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::NotFound => "Record not found",
            Self::Conflict => "Record already exists",
            Self::RateLimited => "Too many requests. Try again later",
            Self::InvalidInput => "Database error",
            Self::Validation => "Invalid request parameters",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::Configuration => "Service is not configured",
            Self::UnsupportedType => "Unsupported attribute type",
            Self::MalformedWireValue => "Malformed stored value",
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is never blank; blank input is replaced by the kind's default.
///
/// # Examples
/// ```
/// use lottery_backend::domain::{DomainError, ErrorCode, ErrorKind};
///
/// let err = DomainError::not_found("User");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "User not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "ErrorPayload")]
pub struct DomainError {
    kind: ErrorKind,
    message: String,
    resource: Option<String>,
    details: Option<Value>,
}

impl DomainError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.default_message().to_owned()
        } else {
            message
        };
        Self {
            kind,
            message,
            resource: None,
            details: None,
        }
    }

    /// Failure category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// HTTP status inbound adapters should report.
    pub fn http_status_hint(&self) -> u16 {
        self.code().http_status()
    }

    /// Whether the caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Name of the resource the failure refers to, when known.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Supplementary error details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach the resource name.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use lottery_backend::domain::DomainError;
    /// use serde_json::json;
    ///
    /// let err = DomainError::validation("bad email")
    ///     .with_details(json!({ "field": "email" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// `NotFound` for a named resource, with the message `"<resource> not found"`.
    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::new(ErrorKind::NotFound, format!("{resource} not found")).with_resource(resource)
    }

    /// `Conflict` for a named resource, with the message `"<resource> already exists"`.
    pub fn conflict(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::new(ErrorKind::Conflict, format!("{resource} already exists")).with_resource(resource)
    }

    /// Convenience constructor for [`ErrorKind::RateLimited`].
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    /// Convenience constructor for [`ErrorKind::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Convenience constructor for [`ErrorKind::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Convenience constructor for [`ErrorKind::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorKind::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorKind::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DomainError {}

impl From<CodecError> for DomainError {
    fn from(value: CodecError) -> Self {
        let kind = match value {
            CodecError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            CodecError::MalformedWireValue { .. } => ErrorKind::MalformedWireValue,
        };
        Self::new(kind, value.to_string())
    }
}

/// Serialised shape handed to inbound adapters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorPayload {
    status: u16,
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<DomainError> for ErrorPayload {
    fn from(value: DomainError) -> Self {
        Self {
            status: value.http_status_hint(),
            code: value.code(),
            message: value.message,
            resource: value.resource,
            details: value.details,
        }
    }
}
