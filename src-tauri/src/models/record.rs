//! # 记录数据模型
//!
//! 记录完全由外部合约持有：客户端只提交内容、按 ID 查询，
//! 并且只保留最近一次读取到的那一条。

use alloy_primitives::{Address, B256, U256};
use serde::Serialize;

use crate::utils::format;

/// 合约中的一条记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 合约分配的 ID
    pub id: U256,
    /// 记录内容，原样保留合约返回值
    pub content: String,
    /// 提交者地址
    pub author: Address,
}

/// 写入交易确认后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub transaction_hash: B256,
    /// 从创建事件中解出的 ID；接口未声明事件或回执中没有匹配日志时为 `None`
    pub record_id: Option<U256>,
}

/// 前端展示用的记录
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface RecordView {
///   id: string;
///   content: string;
///   author: string;
///   explorerUrl: string;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    /// 十进制 ID
    pub id: String,
    pub content: String,
    /// EIP-55 校验和格式的地址
    pub author: String,
    /// 区块浏览器中作者地址页的链接
    pub explorer_url: String,
}

impl RecordView {
    pub fn new(record: &Record, explorer_base: &str) -> Self {
        Self {
            id: record.id.to_string(),
            content: record.content.clone(),
            author: record.author.to_string(),
            explorer_url: format::explorer_address_url(explorer_base, &record.author),
        }
    }
}

/// 前端展示用的写入结果
///
/// 界面只在 `ignored` 为 `false` 时清空输入框草稿。
///
/// ```typescript
/// interface SubmitView {
///   ignored: boolean;
///   recordId: string | null;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitView {
    /// 写入正在进行时重复点击被忽略
    pub ignored: bool,
    pub record_id: Option<String>,
}

impl SubmitView {
    pub fn ignored() -> Self {
        Self {
            ignored: true,
            record_id: None,
        }
    }

    pub fn confirmed(receipt: &WriteReceipt) -> Self {
        Self {
            ignored: false,
            record_id: receipt.record_id.map(|id| id.to_string()),
        }
    }
}
