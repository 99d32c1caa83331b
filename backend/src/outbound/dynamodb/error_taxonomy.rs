//! Classification of raw store failures into domain errors.
//!
//! The mapping is a static table keyed by the store's error code. Codes not
//! in the table become a generic `InvalidInput`; nothing is dropped and
//! classification never panics.

use serde_json::json;

use crate::domain::{DomainError, ErrorKind};

/// Resource name used when the failure detail does not name one.
pub const DEFAULT_RESOURCE: &str = "Record";

/// Raw failure reported by the store transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    /// Store error code, e.g. `ConditionalCheckFailedException`.
    pub code: String,
    /// Message supplied with the failure, possibly empty.
    pub message: String,
    /// Free-form detail that may name the affected field as `(field)`.
    pub detail: Option<String>,
}

impl StoreFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    ConflictOnResource,
    NotFoundOnResource,
    Fixed(ErrorKind, &'static str),
    MessageVerbatim,
}

const RULES: &[(&str, Outcome)] = &[
    ("ConditionalCheckFailedException", Outcome::ConflictOnResource),
    ("ResourceNotFoundException", Outcome::NotFoundOnResource),
    (
        "ProvisionedThroughputExceededException",
        Outcome::Fixed(ErrorKind::RateLimited, "Request rate too high. Try again later"),
    ),
    (
        "RequestLimitExceeded",
        Outcome::Fixed(ErrorKind::RateLimited, "Request limit exceeded. Try again later"),
    ),
    (
        "ItemSizeTooLarge",
        Outcome::Fixed(ErrorKind::InvalidInput, "Item size exceeds the maximum allowed"),
    ),
    (
        "TableNotFoundException",
        Outcome::Fixed(ErrorKind::NotFound, "Specified table not found"),
    ),
    ("ValidationException", Outcome::MessageVerbatim),
];

const GENERIC_MESSAGE: &str = "Database error";
const VALIDATION_FALLBACK: &str = "Invalid request parameters";

/// Map a raw store failure to a [`DomainError`].
///
/// The original code and message are kept in the error details.
///
/// # Examples
/// ```
/// use lottery_backend::domain::ErrorKind;
/// use lottery_backend::outbound::dynamodb::{StoreFailure, classify};
///
/// let failure = StoreFailure::new("ConditionalCheckFailedException", "")
///     .with_detail("Key (email) already taken");
/// let err = classify(&failure);
/// assert_eq!(err.kind(), ErrorKind::Conflict);
/// assert_eq!(err.message(), "email already exists");
/// ```
pub fn classify(failure: &StoreFailure) -> DomainError {
    let outcome = RULES
        .iter()
        .find(|(code, _)| *code == failure.code)
        .map(|(_, outcome)| *outcome);

    let error = match outcome {
        Some(Outcome::ConflictOnResource) => DomainError::conflict(resource_name(failure)),
        Some(Outcome::NotFoundOnResource) => DomainError::not_found(resource_name(failure)),
        Some(Outcome::Fixed(kind, message)) => DomainError::new(kind, message),
        Some(Outcome::MessageVerbatim) => {
            let message = if failure.message.trim().is_empty() {
                VALIDATION_FALLBACK
            } else {
                failure.message.as_str()
            };
            DomainError::invalid_input(message)
        }
        None => DomainError::invalid_input(GENERIC_MESSAGE),
    };
    error.with_details(json!({
        "storeCode": failure.code,
        "storeMessage": failure.message,
    }))
}

/// Text inside the first `( )` pair of the detail, or [`DEFAULT_RESOURCE`].
fn resource_name(failure: &StoreFailure) -> &str {
    failure
        .detail
        .as_deref()
        .and_then(|detail| {
            let (_, rest) = detail.split_once('(')?;
            let (name, _) = rest.split_once(')')?;
            Some(name)
        })
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_RESOURCE)
}
