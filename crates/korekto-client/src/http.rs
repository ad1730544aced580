//! reqwest-backed scoring transport.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::instrument;

use korekto_core::error::ScoringServiceError;
use korekto_core::traits::{OutboundRequest, ScoringTransport, TransportResponse};

/// Sends scoring requests over HTTP.
///
/// The timeout comes from each request rather than the client, so one
/// transport can serve evaluations with different endpoint settings.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with custom TLS roots or a proxy.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn classify(&self, e: reqwest::Error, request: &OutboundRequest) -> ScoringServiceError {
        if e.is_timeout() {
            ScoringServiceError::Timeout(request.timeout.as_secs())
        } else if e.is_connect() {
            ScoringServiceError::network_caused_by(
                format!("scoring service not reachable at {}", request.url),
                e,
            )
        } else {
            ScoringServiceError::network_caused_by(format!("request to {} failed", request.url), e)
        }
    }
}

#[async_trait]
impl ScoringTransport for HttpTransport {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn post(
        &self,
        request: &OutboundRequest,
    ) -> Result<TransportResponse, ScoringServiceError> {
        let response = self
            .client
            .post(&request.url)
            .timeout(request.timeout)
            .basic_auth(&request.user, Some(&request.password))
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| self.classify(e, request))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify(e, request))?;

        tracing::debug!(status, bytes = body.len(), "scoring service replied");
        Ok(TransportResponse { status, body })
    }
}
