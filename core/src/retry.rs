//! Bounded retry around a single HTTP call.
//!
//! # Design
//! `send_with_retry` is a plain loop over one `Transport::execute` per
//! attempt. A transport error, a per-attempt timeout and a non-200 status all
//! count as a failed attempt and consume the same budget. The call settles
//! exactly once: with the body of the first 200 response, or with the error
//! of the last attempt once the budget is spent. Nothing is shared between
//! calls, so any number of them can be in flight with their own budgets.

use std::time::Duration;

use async_trait::async_trait;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{Error, TransportError};
use crate::http::{HttpRequest, HttpResponse};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Executes one `HttpRequest` over the network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// How many times a call is attempted and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
    max_backoff: Duration,
    attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Retry right away with no delay between attempts.
    pub fn immediate() -> Self {
        Self {
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Total attempts including the first; at least 1.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        if self.max_backoff < base_backoff {
            self.max_backoff = base_backoff;
        }
        self
    }

    pub fn max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff.max(self.base_backoff);
        self
    }

    /// Must exceed any long-poll `timeout` passed to `getUpdates`.
    pub fn attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the given failed attempt (1-based): doubles each time,
    /// capped at `max_backoff`.
    pub fn backoff_for(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_backoff)
    }
}

/// Send `request`, retrying failed attempts until `policy` is exhausted.
///
/// Returns the raw body of the first response with status 200.
pub async fn send_with_retry(
    transport: &dyn Transport,
    request: &HttpRequest,
    policy: &RetryPolicy,
) -> Result<String, Error> {
    let call_id = Uuid::new_v4();
    let span = tracing::debug_span!("bot_call", %call_id, action = %request.path, method = %request.method);

    async move {
        let mut remaining = policy.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            remaining -= 1;

            let err = match attempt_once(transport, request, policy.attempt_timeout).await {
                Ok(body) => {
                    tracing::debug!(attempt, "call succeeded");
                    return Ok(body);
                }
                Err(err) => err,
            };

            if remaining == 0 {
                tracing::warn!(attempt, error = %err, "call failed, no attempts left");
                return Err(err);
            }

            let delay = policy.backoff_for(attempt);
            tracing::warn!(attempt, remaining, ?delay, error = %err, "attempt failed, retrying");
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
    .instrument(span)
    .await
}

async fn attempt_once(
    transport: &dyn Transport,
    request: &HttpRequest,
    timeout: Duration,
) -> Result<String, Error> {
    let response = tokio::time::timeout(timeout, transport.execute(request))
        .await
        .map_err(|_| TransportError::Timeout(timeout))??;

    if response.is_success() {
        Ok(response.body)
    } else {
        Err(Error::Status {
            status: response.status,
            body: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpMethod;

    /// Plays back a fixed list of outcomes, then keeps failing.
    struct Scripted {
        outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<HttpResponse, TransportError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Issue(format!("fault {n}"))))
        }
    }

    /// Never completes.
    struct Hanging;

    #[async_trait]
    impl Transport for Hanging {
        async fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            std::future::pending().await
        }
    }

    fn ok(body: &str) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn status(code: u16) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: code,
            body: format!("status {code}"),
        })
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            base_url: "http://localhost/bottest".to_string(),
            path: "getMe".to_string(),
            body: None,
        }
    }

    #[tokio::test]
    async fn always_failing_transport_is_tried_five_times() {
        let transport = Scripted::new(Vec::new());
        let err = send_with_retry(&transport, &request(), &RetryPolicy::immediate())
            .await
            .unwrap_err();

        assert_eq!(transport.calls(), 5);
        assert!(matches!(err, Error::Transport(TransportError::Issue(ref msg)) if msg == "fault 5"));
    }

    #[tokio::test]
    async fn success_on_third_attempt_stops_retrying() {
        let transport = Scripted::new(vec![
            Err(TransportError::Issue("refused".to_string())),
            Err(TransportError::Issue("refused".to_string())),
            ok(r#"{"ok":true}"#),
            ok("never reached"),
        ]);
        let body = send_with_retry(&transport, &request(), &RetryPolicy::immediate())
            .await
            .unwrap();

        assert_eq!(body, r#"{"ok":true}"#);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn non_200_statuses_are_retried() {
        let transport = Scripted::new(vec![status(500), status(201), ok("done")]);
        let body = send_with_retry(&transport, &request(), &RetryPolicy::immediate())
            .await
            .unwrap();

        assert_eq!(body, "done");
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_status_failures_return_last_status() {
        let transport = Scripted::new(vec![status(500), status(502), status(503), status(429), status(404)]);
        let err = send_with_retry(&transport, &request(), &RetryPolicy::immediate())
            .await
            .unwrap_err();

        assert_eq!(transport.calls(), 5);
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn custom_budget_is_respected() {
        let transport = Scripted::new(Vec::new());
        let policy = RetryPolicy::immediate().max_attempts(2);
        send_with_retry(&transport, &request(), &policy).await.unwrap_err();
        assert_eq!(transport.calls(), 2);

        let transport = Scripted::new(Vec::new());
        let policy = RetryPolicy::immediate().max_attempts(0);
        send_with_retry(&transport, &request(), &policy).await.unwrap_err();
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_attempts_time_out() {
        let policy = RetryPolicy::default().attempt_timeout(Duration::from_secs(1));
        let err = send_with_retry(&Hanging, &request(), &policy).await.unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Timeout(d)) if d == Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_waits_between_attempts() {
        let transport = Scripted::new(vec![status(500), status(500), ok("late")]);
        let started = tokio::time::Instant::now();
        let body = send_with_retry(&transport, &request(), &RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(body, "late");
        // 100ms after the first failure, 200ms after the second
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn concurrent_calls_have_independent_budgets() {
        let transport = Scripted::new(Vec::new());
        let policy = RetryPolicy::immediate();
        let req = request();
        let (a, b) = tokio::join!(
            send_with_retry(&transport, &req, &policy),
            send_with_retry(&transport, &req, &policy),
        );
        assert!(a.is_err());
        assert!(b.is_err());
        assert_eq!(transport.calls(), 10);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(10), Duration::from_secs(2));
        assert_eq!(RetryPolicy::immediate().backoff_for(4), Duration::ZERO);
    }

    #[test]
    fn default_budget_is_five_attempts() {
        assert_eq!(RetryPolicy::default().attempts(), 5);
    }
}
