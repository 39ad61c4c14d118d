//! # 写入与读取操作
//!
//! - [`submit`]：发送状态变更交易，等待回执确认（第二个挂起点，默认无限期等待）
//! - [`retrieve`]：只读调用，节点响应即返回
//!
//! 输入校验（[`NonEmptyContent`]、[`RecordId`]）在任何网络请求之前完成。

use std::time::Duration;

use alloy_primitives::U256;

use crate::models::record::{Record, WriteReceipt};
use crate::services::contract::ContractHandle;
use crate::services::errors::ClientError;
use crate::services::rpc::RpcError;
use crate::services::wallet::WalletProvider;

/// 去除首尾空白后非空的内容
///
/// 校验只看去空白后的结果，提交给合约的是用户输入的原文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyContent(String);

impl NonEmptyContent {
    /// 校验用户输入
    ///
    /// # 参数
    /// - `input` - 输入框原文
    /// - `noun` - 记录的称呼，用于拼接提示文本
    ///
    /// # 错误
    /// 内容为空或只有空白时返回 `InvalidInput`
    pub fn parse(input: &str, noun: &str) -> Result<Self, ClientError> {
        if input.trim().is_empty() {
            return Err(ClientError::InvalidInput(format!("请输入{}内容", noun)));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 用户输入的记录 ID：去空白后的非负十进制整数，且不超过 `uint256`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(U256);

impl RecordId {
    /// 校验用户输入的 ID
    ///
    /// 只接受十进制数字，不接受符号、小数、十六进制和科学计数法。
    ///
    /// # 错误
    /// 输入无效或超出 `uint256` 时返回 `InvalidInput`
    pub fn parse(input: &str, noun: &str) -> Result<Self, ClientError> {
        let trimmed = input.trim();
        let invalid = || ClientError::InvalidInput(format!("请输入有效的{} ID", noun));

        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        trimmed.parse::<U256>().map(Self).map_err(|_| invalid())
    }

    pub fn value(&self) -> U256 {
        self.0
    }
}

/// 提交一条新记录并等待链上确认
///
/// 不做幂等保证：失败后再次调用会发起一笔全新的交易。
///
/// # 参数
/// - `provider` - 钱包提供者，负责签名、广播和等待回执
/// - `handle` - 已绑定的合约句柄
/// - `content` - 经过校验的内容
/// - `timeout` - 等待确认的最长时间；`None` 表示一直等待
///
/// # 返回值
/// 交易哈希，以及从创建事件中解出的记录 ID
///
/// # 错误
/// 合约地址无效、用户拒绝签名、交易被回滚、等待超时或传输失败时返回 `Write`
pub async fn submit<P: WalletProvider>(
    provider: &P,
    handle: &ContractHandle,
    content: &NonEmptyContent,
    timeout: Option<Duration>,
) -> Result<WriteReceipt, ClientError> {
    let request = handle.write_request(content.as_str()).map_err(ClientError::Write)?;

    let receipt = provider
        .send_and_confirm(&request, timeout)
        .await
        .map_err(|e| match (e, timeout) {
            (RpcError::ConfirmationTimeout, Some(limit)) => {
                log::warn!("交易在 {:?} 内未确认", limit);
                ClientError::Write(format!("等待交易确认超时（{} 秒）", limit.as_secs()))
            }
            (e, _) => {
                log::error!("写入交易失败: {}", e);
                ClientError::from_write(&e)
            }
        })?;

    let hash = receipt.transaction_hash;
    if !receipt.status() {
        log::warn!("交易 {} 被合约回滚", hash);
        return Err(ClientError::Write("交易已被合约回滚".to_string()));
    }

    let record_id = handle
        .target()
        .ok()
        .and_then(|contract| handle.interface().created_id(contract, receipt.inner.logs()));
    log::info!("交易 {} 已确认，记录 ID: {:?}", hash, record_id);

    Ok(WriteReceipt {
        transaction_hash: hash,
        record_id,
    })
}

/// 按 ID 读取记录，返回值不做任何转换
///
/// # 错误
/// 合约地址无效、记录不存在（合约回滚）、返回值无法解码或传输失败时返回 `Read`
pub async fn retrieve<P: WalletProvider>(
    provider: &P,
    handle: &ContractHandle,
    id: RecordId,
) -> Result<Record, ClientError> {
    let request = handle.read_request(id.value()).map_err(ClientError::Read)?;
    let output = provider.call(&request).await.map_err(|e| {
        log::error!("读取记录 {} 失败: {}", id.value(), e);
        ClientError::from_read(&e)
    })?;

    let (content, author) = handle.interface().decode_read(&output).map_err(|e| {
        log::error!("读取记录 {} 的返回值无法解码: {}", id.value(), e);
        ClientError::Read(e)
    })?;

    Ok(Record {
        id: id.value(),
        content,
        author,
    })
}
