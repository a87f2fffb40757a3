//! Transport layer: one request in, one envelope (or failure value) out.

use async_trait::async_trait;

use crate::error::TransportFailure;
use crate::protocol::{RpcRequest, RpcResponse};

mod http;

pub use http::HttpTransport;

/// Outcome of a single exchange as seen by the classifier.
pub type ExchangeResult = std::result::Result<RpcResponse, TransportFailure>;

/// Sends one request to one endpoint.
///
/// Implementations never retry and never return a crash: every failure is
/// folded into a [`TransportFailure`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Where requests go, for diagnostics.
    fn endpoint(&self) -> &str;

    /// Perform one request/reply exchange.
    async fn exchange(&self, request: &RpcRequest) -> ExchangeResult;
}

#[cfg(test)]
pub(crate) mod test_support;
