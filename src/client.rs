//! Client that builds, dispatches and classifies requests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use crate::classify::{classify, Category, Classification};
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::protocol::{RequestId, RpcRequest};
use crate::transport::{HttpTransport, Transport};

/// One request together with its classified outcome.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub request: RpcRequest,
    pub classification: Classification,
    pub elapsed: Duration,
}

impl Exchange {
    pub fn category(&self) -> Category {
        self.classification.category()
    }

    pub fn diagnostic(&self) -> String {
        self.classification.diagnostic()
    }
}

/// Cheap to clone; clones share the transport and the id sequence.
#[derive(Clone)]
pub struct ProbeClient {
    transport: Arc<dyn Transport>,
    next_id: Arc<AtomicI64>,
}

impl std::fmt::Debug for ProbeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeClient")
            .field("endpoint", &self.transport.endpoint())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

impl ProbeClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Client over HTTP using `config`.
    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Ids are unique per client (and its clones), starting at 1.
    fn next_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Call a generic method. Fails only when the request cannot be built.
    pub async fn call(&self, method: &str, params: Value) -> Result<Exchange> {
        let request = RpcRequest::new(method, params, self.next_id())?;
        Ok(self.send(request).await)
    }

    /// Invoke a named tool through `tools/call`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Exchange> {
        let request = RpcRequest::tool_call(name, arguments, self.next_id())?;
        Ok(self.send(request).await)
    }

    /// Dispatch an already-built request and classify the reply.
    pub async fn send(&self, request: RpcRequest) -> Exchange {
        debug!(method = %request.method, call = %request.label(), id = %request.id, "dispatching request");

        let started = Instant::now();
        let outcome = self.transport.exchange(&request).await;
        let elapsed = started.elapsed();

        if let Ok(response) = &outcome {
            if response.id.is_some() && !response.matches_id(&request.id) {
                warn!(
                    expected = %request.id,
                    received = ?response.id,
                    "response id does not match request id"
                );
            }
        }

        let classification = classify(outcome);
        debug!(
            call = %request.label(),
            category = %classification.category(),
            elapsed_ms = elapsed.as_millis() as u64,
            "exchange classified"
        );

        Exchange {
            request,
            classification,
            elapsed,
        }
    }
}
