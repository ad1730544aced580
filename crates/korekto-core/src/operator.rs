//! The remote scoring operator.
//!
//! Each evaluation is one linear pass: validate the operand, render the
//! request, make a single call through the transport, read the score.
//! Nothing is cached or shared between evaluations apart from the
//! read-only [`EndpointConfig`].

use std::future::Future;

use tracing::{debug, info, instrument, warn};

use crate::codec::{build_request_body, parse_score, CONTENT_TYPE};
use crate::config::EndpointConfig;
use crate::error::{OperatorError, ScoringServiceError};
use crate::model::{BaseType, Cardinality, Operand, ScoreResult};
use crate::traits::{OutboundRequest, ScoringTransport};

/// Longest slice of an error body kept in [`ScoringServiceError::HttpStatus`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Scores a candidate response by delegating to a remote service.
pub struct ScoringOperator<T> {
    transport: T,
}

impl<T: ScoringTransport> ScoringOperator<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Evaluate the operator for one item.
    ///
    /// Operand problems are reported before anything is sent. Once the
    /// request has gone out, every failure surfaces as
    /// [`OperatorError::ScoringService`]; there is no retry and no fallback
    /// score.
    #[instrument(skip(self, operands, config), fields(item = %item_identifier))]
    pub async fn evaluate(
        &self,
        operands: &[Operand],
        item_identifier: &str,
        config: &EndpointConfig,
    ) -> Result<ScoreResult, OperatorError> {
        let response = validate_operands(operands)?;
        let request = build_outbound_request(item_identifier, response, config);

        debug!(url = %request.url, bytes = request.body.len(), "sending scoring request");

        // The transport is expected to honour the timeout itself; this bounds
        // transports that do not.
        let reply = tokio::time::timeout(request.timeout, self.transport.post(&request))
            .await
            .unwrap_or(Err(ScoringServiceError::Timeout(config.timeout)))
            .map_err(|e| {
                warn!(error = %e, "scoring service call failed");
                e
            })?;

        if !reply.is_success() {
            warn!(status = reply.status, "scoring service returned an error status");
            return Err(ScoringServiceError::HttpStatus {
                status: reply.status,
                body: reply.body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            }
            .into());
        }

        let score = parse_score(&reply.body).map_err(|e| {
            warn!(error = %e, "unreadable scoring response");
            e
        })?;

        info!(score, "item scored");
        Ok(ScoreResult::new(score))
    }

    /// Like [`evaluate`](Self::evaluate), but gives up as soon as `cancel`
    /// completes. The in-flight request is dropped, which aborts it.
    ///
    /// Operand validation still takes precedence over cancellation.
    pub async fn evaluate_until<F>(
        &self,
        operands: &[Operand],
        item_identifier: &str,
        config: &EndpointConfig,
        cancel: F,
    ) -> Result<ScoreResult, OperatorError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            result = self.evaluate(operands, item_identifier, config) => result,
            _ = cancel => {
                warn!(item = item_identifier, "scoring request cancelled");
                Err(OperatorError::Cancelled)
            }
        }
    }
}

/// Check operand count, cardinality and base type, in that order.
///
/// Returns the string to send as the candidate response.
pub fn validate_operands(operands: &[Operand]) -> Result<&str, OperatorError> {
    let operand = match operands {
        [] => return Err(OperatorError::InsufficientOperands),
        [operand] => operand,
        _ => return Err(OperatorError::TooManyOperands(operands.len())),
    };

    let (cardinality, base_type, content) = operand.normalized();

    if cardinality != Cardinality::Single {
        return Err(OperatorError::WrongCardinality(cardinality));
    }
    if !matches!(base_type, BaseType::String | BaseType::Identifier) {
        return Err(OperatorError::WrongBaseType(base_type));
    }

    Ok(content)
}

/// Assemble the outbound request for an already validated response string.
pub fn build_outbound_request(
    item_identifier: &str,
    response: &str,
    config: &EndpointConfig,
) -> OutboundRequest {
    OutboundRequest {
        url: config.score_item_url(),
        content_type: CONTENT_TYPE,
        body: build_request_body(item_identifier, response),
        user: config.user.clone(),
        password: config.password.clone(),
        timeout: config.timeout_duration(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::traits::TransportResponse;

    enum Reply {
        Status(u16, &'static str),
        Timeout,
        Refused,
        Hang,
    }

    struct FakeTransport {
        reply: Reply,
        requests: Mutex<Vec<OutboundRequest>>,
    }

    impl FakeTransport {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn replying(body: &'static str) -> Self {
            Self::new(Reply::Status(200, body))
        }

        fn requests(&self) -> Vec<OutboundRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScoringTransport for FakeTransport {
        async fn post(
            &self,
            request: &OutboundRequest,
        ) -> Result<TransportResponse, ScoringServiceError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Reply::Status(status, body) => Ok(TransportResponse {
                    status: *status,
                    body: body.to_string(),
                }),
                Reply::Timeout => Err(ScoringServiceError::Timeout(request.timeout.as_secs())),
                Reply::Refused => {
                    Err(ScoringServiceError::network("connection refused"))
                }
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    const HALF: &str = "<scoreItemResponse><score>0.5</score></scoreItemResponse>";

    fn config() -> EndpointConfig {
        EndpointConfig::new("https://scoring.example.org", 7, "grader", "s3cret")
    }

    fn operator(reply: Reply) -> ScoringOperator<FakeTransport> {
        ScoringOperator::new(FakeTransport::new(reply))
    }

    #[tokio::test]
    async fn returns_parsed_score() {
        let op = ScoringOperator::new(FakeTransport::replying(HALF));
        let result = op
            .evaluate(&[Operand::identifier("ChoiceA")], "item42", &config())
            .await
            .unwrap();
        assert_eq!(result.score, 0.5);
        assert_eq!(result.cardinality(), Cardinality::Single);
    }

    #[tokio::test]
    async fn outbound_request_shape() {
        let op = ScoringOperator::new(FakeTransport::replying(HALF));
        op.evaluate(&[Operand::identifier("ChoiceA")], "item42", &config())
            .await
            .unwrap();

        let requests = op.transport().requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.url, "https://scoring.example.org/scoreItem");
        assert_eq!(request.content_type, "application/xml");
        assert_eq!(request.user, "grader");
        assert_eq!(request.password, "s3cret");
        assert_eq!(request.timeout, Duration::from_secs(7));
        assert_eq!(request.body, build_request_body("item42", "ChoiceA"));
    }

    #[tokio::test]
    async fn wrong_operand_count_never_calls_service() {
        let op = ScoringOperator::new(FakeTransport::replying(HALF));

        let err = op.evaluate(&[], "item42", &config()).await.unwrap_err();
        assert!(matches!(err, OperatorError::InsufficientOperands));

        for count in [2, 3, 10] {
            let operands = vec![Operand::string("x"); count];
            let err = op.evaluate(&operands, "item42", &config()).await.unwrap_err();
            assert!(matches!(err, OperatorError::TooManyOperands(n) if n == count));
            assert!(err.to_string().contains(&count.to_string()));
            assert!(err.is_validation());
        }

        assert!(op.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn null_operand_is_sent_as_empty_string() {
        let op = ScoringOperator::new(FakeTransport::replying(HALF));
        op.evaluate(&[Operand::null()], "item42", &config())
            .await
            .unwrap();
        op.evaluate(&[Operand::string("")], "item42", &config())
            .await
            .unwrap();

        let requests = op.transport().requests();
        assert_eq!(requests[0], requests[1]);
        assert!(requests[0].body.contains("<response></response>"));
    }

    #[tokio::test]
    async fn wrong_cardinality_regardless_of_base_type() {
        let op = ScoringOperator::new(FakeTransport::replying(HALF));
        for cardinality in [
            Cardinality::Multiple,
            Cardinality::Ordered,
            Cardinality::Record,
        ] {
            for base_type in [BaseType::String, BaseType::Identifier, BaseType::Float] {
                let operand = Operand::new(cardinality, base_type, "A");
                let err = op
                    .evaluate(&[operand], "item42", &config())
                    .await
                    .unwrap_err();
                assert!(
                    matches!(err, OperatorError::WrongCardinality(c) if c == cardinality),
                    "{cardinality}/{base_type}: {err}"
                );
            }
        }
        assert!(op.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn wrong_base_type() {
        let op = ScoringOperator::new(FakeTransport::replying(HALF));
        for base_type in BaseType::ALL {
            let operand = Operand::new(Cardinality::Single, base_type, "1");
            let result = op.evaluate(&[operand], "item42", &config()).await;
            match base_type {
                BaseType::String | BaseType::Identifier => assert!(result.is_ok()),
                other => assert!(
                    matches!(result, Err(OperatorError::WrongBaseType(bt)) if bt == other)
                ),
            }
        }
        assert_eq!(op.transport().requests().len(), 2);
    }

    #[tokio::test]
    async fn missing_score_is_service_error() {
        let op = ScoringOperator::new(FakeTransport::replying(
            "<scoreItemResponse><status>done</status></scoreItemResponse>",
        ));
        let err = op
            .evaluate(&[Operand::string("x")], "item42", &config())
            .await
            .unwrap_err();
        assert!(matches!(
            err.service_error(),
            Some(ScoringServiceError::MissingScore)
        ));
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn timeout_fails_without_retry() {
        let op = operator(Reply::Timeout);
        let err = op
            .evaluate(&[Operand::string("x")], "item42", &config())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OperatorError::ScoringService(ScoringServiceError::Timeout(7))
        ));
        assert_eq!(op.transport().requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_transport_is_bounded_by_timeout() {
        let op = operator(Reply::Hang);
        let err = op
            .evaluate(&[Operand::string("x")], "item42", &config())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OperatorError::ScoringService(ScoringServiceError::Timeout(7))
        ));
        assert_eq!(op.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn network_failure_fails_without_retry() {
        let op = operator(Reply::Refused);
        let err = op
            .evaluate(&[Operand::string("x")], "item42", &config())
            .await
            .unwrap_err();
        assert!(matches!(
            err.service_error(),
            Some(ScoringServiceError::Network { .. })
        ));
        assert_eq!(op.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn error_status_is_reported_before_parsing() {
        let op = operator(Reply::Status(500, "<html><body>Boom</body></html>"));
        let err = op
            .evaluate(&[Operand::string("x")], "item42", &config())
            .await
            .unwrap_err();
        match err.service_error() {
            Some(ScoringServiceError::HttpStatus { status, body }) => {
                assert_eq!(*status, 500);
                assert!(body.contains("Boom"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn identical_invocations_send_identical_requests() {
        let op = ScoringOperator::new(FakeTransport::replying(HALF));
        let config = config();
        let operands = [Operand::identifier("ChoiceA")];
        let first = op.evaluate(&operands, "item42", &config).await.unwrap();
        let second = op.evaluate(&operands, "item42", &config).await.unwrap();
        assert_eq!(first, second);

        let requests = op.transport().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
        assert_eq!(requests[0].body.as_bytes(), requests[1].body.as_bytes());
    }

    #[tokio::test]
    async fn concurrent_invocations_share_config() {
        let op = Arc::new(ScoringOperator::new(FakeTransport::replying(HALF)));
        let config = Arc::new(config());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let op = Arc::clone(&op);
                let config = Arc::clone(&config);
                tokio::spawn(async move {
                    op.evaluate(&[Operand::string(format!("r{i}"))], "item42", &config)
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().score, 0.5);
        }
        assert_eq!(op.transport().requests().len(), 8);
    }

    #[tokio::test]
    async fn shared_trait_object_transport() {
        let transport: Arc<dyn ScoringTransport> = Arc::new(FakeTransport::replying(HALF));
        let op = ScoringOperator::new(transport);
        let result = op
            .evaluate(&[Operand::string("x")], "item42", &config())
            .await
            .unwrap();
        assert_eq!(result.score, 0.5);
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_call() {
        let op = operator(Reply::Hang);
        let err = op
            .evaluate_until(&[Operand::string("x")], "item42", &config(), async {})
            .await
            .unwrap_err();
        assert!(matches!(err, OperatorError::Cancelled));
        assert_eq!(op.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn validation_wins_over_cancellation() {
        let op = operator(Reply::Hang);
        let err = op
            .evaluate_until(&[], "item42", &config(), async {})
            .await
            .unwrap_err();
        assert!(matches!(err, OperatorError::InsufficientOperands));
        assert!(op.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn uncancelled_call_completes() {
        let op = ScoringOperator::new(FakeTransport::replying(HALF));
        let result = op
            .evaluate_until(
                &[Operand::string("x")],
                "item42",
                &config(),
                std::future::pending::<()>(),
            )
            .await
            .unwrap();
        assert_eq!(result.score, 0.5);
    }
}
