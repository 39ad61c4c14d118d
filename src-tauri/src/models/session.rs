//! # 会话视图模型
//!
//! [`SessionView`] 是界面渲染所需的全部状态快照，由 `get_session_view` command 返回。

use serde::Serialize;

use crate::models::record::RecordView;
use crate::services::variant::VariantLabels;

/// 钱包连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Disconnected,
    /// 正在等待用户在钱包中授权
    Connecting,
    Connected,
}

/// 前端渲染用的会话快照
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface SessionView {
///   status: 'disconnected' | 'connecting' | 'connected';
///   account: string | null;
///   accountLabel: string;
///   submitEnabled: boolean;
///   retrieveEnabled: boolean;
///   pendingWrite: boolean;
///   submitLabel: string;
///   lastRecord: RecordView | null;
///   labels: VariantLabels;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub status: SessionStatus,
    /// 完整的校验和地址
    pub account: Option<String>,
    /// 连接按钮文案：未连接时为 "连接钱包"，连接后为缩写地址
    pub account_label: String,
    pub submit_enabled: bool,
    pub retrieve_enabled: bool,
    pub pending_write: bool,
    pub submit_label: String,
    /// 最近一次成功读取的记录
    pub last_record: Option<RecordView>,
    pub labels: VariantLabels,
}
