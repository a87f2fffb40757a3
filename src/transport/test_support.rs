use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportFailure;
use crate::protocol::{RpcRequest, RpcResponse};

use super::{ExchangeResult, Transport};

/// Replays canned replies in order and records what was sent.
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<ExchangeResult>>,
    sent: Mutex<Vec<RpcRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(replies: Vec<ExchangeResult>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Every reply is the raw JSON body given.
    pub(crate) fn with_bodies(bodies: Vec<Value>) -> Self {
        Self::new(
            bodies
                .into_iter()
                .map(|body| {
                    serde_json::from_value::<RpcResponse>(body)
                        .map_err(|e| TransportFailure::other(e.to_string()))
                })
                .collect(),
        )
    }

    pub(crate) fn sent(&self) -> Vec<RpcRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        "scripted://"
    }

    async fn exchange(&self, request: &RpcRequest) -> ExchangeResult {
        self.sent.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure::connection("script exhausted")))
    }
}
