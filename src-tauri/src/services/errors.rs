//! # 错误分类与提示文本提取
//!
//! 客户端的每次尝试最多以一种 [`ClientError`] 结束，均不自动重试。
//! Tauri command 层把它们转换为阻塞式消息框，并以字符串返回给前端。
//!
//! ## 提示文本提取顺序
//! 钱包和节点的错误对象可能层层嵌套，[`best_error_message`] 按固定顺序取第一个可用值：
//! 1. 合约给出的回滚原因：`data` 中 ABI 编码的 `Error(string)` / `Panic(uint256)`
//!    （也检查一层嵌套的 `data.data`），或 `execution reverted: <原因>` 形式的消息
//! 2. 嵌套的提供者消息 `data.message`
//! 3. 顶层的传输层/提供者消息
//! 4. 通用兜底文本 [`GENERIC_FAILURE`]

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::hex;
use alloy_sol_types::{Panic, Revert, SolError};
use serde_json::Value;

use crate::services::rpc::RpcError;

/// 所有提取步骤都失败时使用的兜底文本
pub const GENERIC_FAILURE: &str = "未知错误";

/// 节点在回滚消息前添加的前缀
const REVERTED_PREFIX: &str = "execution reverted: ";

/// 一次连接/写入/读取尝试的最终失败原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// 宿主环境中没有可用的钱包提供者
    #[error("未检测到钱包。请安装并启动支持 EIP-1193 的桌面钱包后重试。")]
    ProviderUnavailable,

    /// 用户拒绝授权或提供者返回错误
    #[error("连接钱包失败: {0}")]
    Connection(String),

    /// 调用方输入不满足前置条件，未发起任何网络请求
    #[error("{0}")]
    InvalidInput(String),

    /// 写入交易被拒绝、被回滚或传输失败
    #[error("交易失败: {0}")]
    Write(String),

    /// 只读调用失败（ID 不存在或传输失败）
    #[error("读取失败，请检查 ID: {0}")]
    Read(String),
}

impl ClientError {
    /// 将连接阶段的 RPC 错误归类：端点不可达视为没有钱包
    pub fn from_connect(error: &RpcError) -> Self {
        match error {
            RpcError::Unreachable(_) => ClientError::ProviderUnavailable,
            other => ClientError::Connection(best_error_message(other)),
        }
    }

    pub fn from_write(error: &RpcError) -> Self {
        ClientError::Write(best_error_message(error))
    }

    pub fn from_read(error: &RpcError) -> Self {
        ClientError::Read(best_error_message(error))
    }
}

/// 从 RPC 错误中取出最适合展示给用户的文本
pub fn best_error_message(error: &RpcError) -> String {
    contract_reason(error)
        .or_else(|| nested_message(error))
        .or_else(|| transport_message(error))
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

fn contract_reason(error: &RpcError) -> Option<String> {
    let RpcError::Response { message, data, .. } = error else {
        return None;
    };

    let from_data = data.as_ref().and_then(|data| {
        revert_data_reason(data).or_else(|| data.get("data").and_then(revert_data_reason))
    });

    from_data.or_else(|| {
        message
            .strip_prefix(REVERTED_PREFIX)
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string)
    })
}

fn revert_data_reason(data: &Value) -> Option<String> {
    let bytes = hex::decode(data.as_str()?).ok()?;
    decode_revert(&bytes)
}

/// 解码 ABI 编码的回滚数据
///
/// 仅识别 Solidity 内置的 `Error(string)` 与 `Panic(uint256)`；
/// 自定义错误没有接口描述可依，交由后续步骤处理。
pub fn decode_revert(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (selector, body) = data.split_at(4);

    if selector == Revert::SELECTOR.as_slice() {
        let decoded = DynSolType::Tuple(vec![DynSolType::String])
            .abi_decode_params(body)
            .ok()?;
        return match decoded {
            DynSolValue::Tuple(values) => values
                .first()
                .and_then(DynSolValue::as_str)
                .filter(|reason| !reason.is_empty())
                .map(str::to_string),
            _ => None,
        };
    }

    if selector == Panic::SELECTOR.as_slice() {
        let decoded = DynSolType::Tuple(vec![DynSolType::Uint(256)])
            .abi_decode_params(body)
            .ok()?;
        let code = match decoded {
            DynSolValue::Tuple(values) => values.first().and_then(DynSolValue::as_uint)?.0,
            _ => return None,
        };
        return Some(format!("合约 panic (0x{code:x})"));
    }

    None
}

fn nested_message(error: &RpcError) -> Option<String> {
    let RpcError::Response {
        data: Some(data), ..
    } = error
    else {
        return None;
    };
    data.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

fn transport_message(error: &RpcError) -> Option<String> {
    let message = error.to_string();
    (!message.trim().is_empty()).then_some(message)
}
