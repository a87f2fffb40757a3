//! JSON-RPC envelope types and the request builder.

pub mod request;
pub mod response;

pub use request::{coerce_params, RequestId, RpcRequest, ToolCall, JSONRPC_VERSION, TOOLS_CALL};
pub use response::{RpcError, RpcResponse};
