//! Operator error types.
//!
//! Validation failures are raised before any network activity; everything
//! that can go wrong once the scoring service is contacted is wrapped in
//! [`ScoringServiceError`] so the host can tell the two apart.

use thiserror::Error;

/// Boxed underlying cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

use crate::model::{BaseType, Cardinality};

/// Errors returned by [`ScoringOperator::evaluate`](crate::operator::ScoringOperator::evaluate).
#[derive(Debug, Error)]
pub enum OperatorError {
    /// No operand was supplied.
    #[error("the scoring operator requires exactly one operand, none given")]
    InsufficientOperands,

    /// More than one operand was supplied.
    #[error("the scoring operator requires exactly one operand, {0} given")]
    TooManyOperands(usize),

    #[error("the scoring operator only accepts operands with single cardinality, {0} given")]
    WrongCardinality(Cardinality),

    #[error(
        "the scoring operator only accepts operands with string or identifier base type, {0} given"
    )]
    WrongBaseType(BaseType),

    /// The remote call or its response handling failed.
    #[error("scoring service error")]
    ScoringService(#[from] ScoringServiceError),

    /// The caller's cancellation signal fired while the call was in flight.
    #[error("scoring request cancelled")]
    Cancelled,
}

impl OperatorError {
    /// Returns `true` for failures detected before the service was contacted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OperatorError::InsufficientOperands
                | OperatorError::TooManyOperands(_)
                | OperatorError::WrongCardinality(_)
                | OperatorError::WrongBaseType(_)
        )
    }

    /// The underlying service failure, if this is one.
    pub fn service_error(&self) -> Option<&ScoringServiceError> {
        match self {
            OperatorError::ScoringService(e) => Some(e),
            _ => None,
        }
    }
}

/// Failures talking to the scoring service or reading its reply.
#[derive(Debug, Error)]
pub enum ScoringServiceError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Connection or transport-level failure.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response XML: {0}")]
    MalformedXml(String),

    #[error("response has no <score> element")]
    MissingScore,

    /// The `<score>` text is not a finite decimal number.
    #[error("score is not a number: {0:?}")]
    InvalidScore(String),
}

impl ScoringServiceError {
    /// A network failure with no underlying error value.
    pub fn network(message: impl Into<String>) -> Self {
        ScoringServiceError::Network {
            message: message.into(),
            source: None,
        }
    }

    /// A network failure caused by `source`.
    pub fn network_caused_by(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ScoringServiceError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
