//! # RPC 错误归类
//!
//! 钱包提供者以 JSON-RPC 暴露以太坊接口（EIP-1193 的 HTTP 形态），线路层由 alloy 的
//! provider 栈负责。本模块把 alloy 的传输错误和交易等待错误收敛为统一的 [`RpcError`]，
//! 保留钱包/节点返回的原始错误对象，供
//! [`crate::services::errors::best_error_message`] 提取提示文本。

use std::error::Error as StdError;

use alloy_provider::PendingTransactionError;
use alloy_transport::{TransportError, TransportErrorKind};
use serde_json::Value;

/// 用户在钱包中拒绝请求时返回的 EIP-1193 错误码
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC 调用失败的原因
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    /// 端点拒绝连接：视为宿主环境中没有钱包提供者
    #[error("无法连接到钱包提供者: {0}")]
    Unreachable(String),

    /// 连接已建立但传输失败（HTTP 错误状态、连接被重置等）
    #[error("{0}")]
    Transport(String),

    /// 钱包或节点返回的 JSON-RPC 错误对象
    #[error("{message}")]
    Response {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// 响应无法解析为期望的类型
    #[error("响应解析失败: {0}")]
    Decode(String),

    /// 在限定时间内没有等到交易回执
    #[error("等待交易确认超时")]
    ConfirmationTimeout,
}

impl RpcError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, RpcError::Response { code, .. } if *code == USER_REJECTED_CODE)
    }
}

impl From<TransportError> for RpcError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::ErrorResp(payload) => RpcError::Response {
                code: payload.code,
                message: payload.message.to_string(),
                // 钱包返回的 data 可能不是合法 JSON，此时按字符串保留
                data: payload.data.map(|raw| {
                    serde_json::from_str(raw.get()).unwrap_or_else(|_| Value::String(raw.get().to_string()))
                }),
            },
            TransportError::Transport(kind) => from_transport_kind(kind),
            TransportError::DeserError { err, text } => {
                RpcError::Decode(format!("{}（原始响应: {}）", err, text))
            }
            TransportError::NullResp => RpcError::Decode("节点返回了空结果".to_string()),
            other => RpcError::Transport(other.to_string()),
        }
    }
}

impl From<PendingTransactionError> for RpcError {
    fn from(error: PendingTransactionError) -> Self {
        match error {
            PendingTransactionError::TransportError(e) => e.into(),
            PendingTransactionError::TxWatcher(_) => RpcError::ConfirmationTimeout,
            other => RpcError::Transport(other.to_string()),
        }
    }
}

fn from_transport_kind(kind: TransportErrorKind) -> RpcError {
    let refused = match &kind {
        TransportErrorKind::Custom(source) => is_connection_refused(&**source),
        _ => false,
    };
    if refused {
        RpcError::Unreachable(kind.to_string())
    } else {
        RpcError::Transport(kind.to_string())
    }
}

/// 沿错误链查找"连接被拒绝"
fn is_connection_refused(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(error) = current {
        if let Some(e) = error.downcast_ref::<reqwest::Error>() {
            if e.is_connect() {
                return true;
            }
        }
        if let Some(e) = error.downcast_ref::<std::io::Error>() {
            if e.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        current = error.source();
    }
    false
}
