//! # 应用配置数据模型
//!
//! 对应 `~/.mo/AnonRecords/config.json` 文件内容。所有字段均可省略，
//! 省略时使用默认值；加载后再由环境变量覆盖（见 `services::config`）。

use serde::{Deserialize, Serialize};

use crate::services::variant::{VariantKind, VariantLabels};

/// 默认的钱包 JSON-RPC 端点（Frame 桌面钱包）
pub const DEFAULT_PROVIDER_URL: &str = "http://127.0.0.1:1248";

/// 应用配置
///
/// ```json
/// {
///   "variant": "message",
///   "contractAddress": "0x...",
///   "providerUrl": "http://127.0.0.1:1248",
///   "explorerUrl": "https://etherscan.io",
///   "pollIntervalMs": 1000,
///   "confirmationTimeoutSecs": 300
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// 内置变体，`customInterface` 存在时被忽略
    pub variant: VariantKind,

    /// 已部署合约的地址，原样传给节点
    pub contract_address: String,

    /// 钱包 JSON-RPC 端点；为空字符串表示没有钱包
    pub provider_url: String,

    /// 区块浏览器根地址
    pub explorer_url: String,

    /// 回执轮询间隔（毫秒）
    pub poll_interval_ms: u64,

    /// 等待交易确认的最长时间（秒）；缺省或为 0 表示一直等待
    pub confirmation_timeout_secs: Option<u64>,

    /// 自定义合约接口，替代内置变体
    pub custom_interface: Option<CustomInterfaceConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            variant: VariantKind::default(),
            contract_address: String::new(),
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            explorer_url: crate::services::session::DEFAULT_EXPLORER_URL.to_string(),
            poll_interval_ms: crate::services::wallet::DEFAULT_POLL_INTERVAL_MS,
            confirmation_timeout_secs: None,
            custom_interface: None,
        }
    }
}

/// 自定义合约接口配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomInterfaceConfig {
    /// ABI JSON 文件路径；相对路径相对于配置目录
    pub abi_path: String,
    pub write_function: String,
    pub read_function: String,
    /// 创建事件名称，缺省时写入结果不报告 ID
    #[serde(default)]
    pub event: Option<String>,
    pub labels: VariantLabels,
}
