//! The transport seam between the operator and the network.
//!
//! Implemented over HTTP by `korekto-client`; tests plug in recording fakes.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScoringServiceError;

/// Something that can deliver a scoring request and bring back the reply.
///
/// Implementations must not retry: one call is one outbound request.
#[async_trait]
pub trait ScoringTransport: Send + Sync {
    /// Send `request` and return the raw reply, whatever its status.
    async fn post(&self, request: &OutboundRequest)
        -> Result<TransportResponse, ScoringServiceError>;
}

/// A fully-built scoring request, ready to go on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub content_type: &'static str,
    pub body: String,
    pub user: String,
    pub password: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .field("body", &self.body)
            .field("user", &self.user)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Status and body of the service's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
impl<T: ScoringTransport + ?Sized> ScoringTransport for std::sync::Arc<T> {
    async fn post(
        &self,
        request: &OutboundRequest,
    ) -> Result<TransportResponse, ScoringServiceError> {
        (**self).post(request).await
    }
}
