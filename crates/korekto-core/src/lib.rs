//! korekto-core: the remote scoring operator.
//!
//! Validates the single operand handed over by a QTI response-processing
//! engine, renders the `scoreItemRequest` document, sends it through a
//! [`ScoringTransport`](traits::ScoringTransport) and reads the score back.

pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod operator;
pub mod traits;

pub use config::EndpointConfig;
pub use error::{OperatorError, ScoringServiceError};
pub use model::{BaseType, Cardinality, Operand, ScoreResult};
pub use operator::ScoringOperator;
pub use traits::{OutboundRequest, ScoringTransport, TransportResponse};
