//! Handler abstraction and simulated latency.
//!
//! A handler turns merged parameters and a request body into an
//! [`Envelope`] after zero or more suspension points. Any async closure of
//! the right shape is a handler.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::MockResult;
use crate::routing::Params;

/// Future returned by a handler.
pub type HandlerFuture = BoxFuture<'static, MockResult<Envelope>>;

/// Business logic bound to one `(method, pattern)` pair.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, params: Params, body: Value) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Params, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResult<Envelope>> + Send + 'static,
{
    fn call(&self, params: Params, body: Value) -> HandlerFuture {
        (self)(params, body).boxed()
    }
}

/// Shared, type-erased handler as stored in the route table.
pub type BoxedHandler = Arc<dyn Handler>;

/// Suspend for `ms` milliseconds to imitate a network round trip.
pub async fn delay(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Simulated latency: a base delay plus up to `jitter` extra.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latency {
    pub base: Duration,
    pub jitter: Duration,
}

impl Latency {
    pub const NONE: Latency = Latency {
        base: Duration::ZERO,
        jitter: Duration::ZERO,
    };

    pub fn from_millis(base_ms: u64, jitter_ms: u64) -> Self {
        Self {
            base: Duration::from_millis(base_ms),
            jitter: Duration::from_millis(jitter_ms),
        }
    }

    /// Pick the delay for one call.
    pub fn sample(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(fastrand::u64(0..=jitter_ms))
    }

    pub async fn wait(&self) {
        delay(u64::try_from(self.sample().as_millis()).unwrap_or(u64::MAX)).await;
    }
}

/// Wrap `handler` so every call first waits for `latency`.
pub fn with_latency<H: Handler>(handler: H, latency: Latency) -> impl Handler {
    let handler = Arc::new(handler);
    move |params: Params, body: Value| {
        let handler = handler.clone();
        async move {
            latency.wait().await;
            handler.call(params, body).await
        }
    }
}
