//! Recording transport for testing without a scoring service.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use korekto_core::error::ScoringServiceError;
use korekto_core::traits::{OutboundRequest, ScoringTransport, TransportResponse};

/// What a [`RecordingTransport`] answers with.
#[derive(Debug, Clone)]
pub enum CannedReply {
    Response(TransportResponse),
    Timeout,
    NetworkError(String),
}

/// A transport that keeps every request it is given and answers with a
/// fixed reply.
pub struct RecordingTransport {
    reply: CannedReply,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Requests received, oldest first.
    requests: Mutex<Vec<OutboundRequest>>,
}

impl RecordingTransport {
    pub fn new(reply: CannedReply) -> Self {
        Self {
            reply,
            call_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with `200 OK` and `body`.
    pub fn with_body(body: &str) -> Self {
        Self::new(CannedReply::Response(TransportResponse::ok(body)))
    }

    pub fn with_status(status: u16, body: &str) -> Self {
        Self::new(CannedReply::Response(TransportResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn timing_out() -> Self {
        Self::new(CannedReply::Timeout)
    }

    pub fn failing(message: &str) -> Self {
        Self::new(CannedReply::NetworkError(message.to_string()))
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<OutboundRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ScoringTransport for RecordingTransport {
    async fn post(
        &self,
        request: &OutboundRequest,
    ) -> Result<TransportResponse, ScoringServiceError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().unwrap().push(request.clone());

        match &self.reply {
            CannedReply::Response(response) => Ok(response.clone()),
            CannedReply::Timeout => Err(ScoringServiceError::Timeout(request.timeout.as_secs())),
            CannedReply::NetworkError(message) => {
                Err(ScoringServiceError::network(message.clone()))
            }
        }
    }
}
