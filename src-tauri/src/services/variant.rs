//! # 组件变体
//!
//! "消息" 与 "反馈" 两个界面只在字段命名和合约接口上不同，
//! 这里用同一个 [`Variant`] 描述二者：界面文案 + 经过校验的合约接口。
//! 也可以通过配置中的 `customInterface` 指向任意满足同样形状的合约。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::services::contract::{ContractInterface, InterfaceError, InterfaceNames};

const MESSAGE_ABI: &str = include_str!("../../abi/message.json");
const FEEDBACK_ABI: &str = include_str!("../../abi/feedback.json");

/// 内置变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Message,
    #[default]
    Feedback,
}

impl std::str::FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "message" => Ok(VariantKind::Message),
            "feedback" => Ok(VariantKind::Feedback),
            other => Err(format!("未知的变体: {}（可选 message / feedback）", other)),
        }
    }
}

/// 界面文案
///
/// 对应前端 TypeScript 接口 `VariantLabels`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantLabels {
    /// 页面标题
    pub title: String,
    /// 记录的称呼（如 "消息"），用于拼接提示文本
    pub noun: String,
    /// 写入按钮文案
    pub submit_action: String,
    /// 读取按钮文案
    pub retrieve_action: String,
    /// 写入成功提示
    pub submit_success: String,
}

impl VariantLabels {
    fn for_kind(kind: VariantKind) -> Self {
        match kind {
            VariantKind::Message => Self {
                title: "消息存储 DApp".to_string(),
                noun: "消息".to_string(),
                submit_action: "存储消息".to_string(),
                retrieve_action: "读取消息".to_string(),
                submit_success: "消息存储成功！".to_string(),
            },
            VariantKind::Feedback => Self {
                title: "匿名反馈 DApp".to_string(),
                noun: "反馈".to_string(),
                submit_action: "提交反馈".to_string(),
                retrieve_action: "读取反馈".to_string(),
                submit_success: "反馈提交成功！".to_string(),
            },
        }
    }
}

/// 一个完整的组件变体：文案 + 合约接口
#[derive(Debug, Clone)]
pub struct Variant {
    labels: VariantLabels,
    interface: Arc<ContractInterface>,
}

impl Variant {
    /// 构造内置变体；内置 ABI 编译进二进制，校验失败意味着构建有误
    pub fn builtin(kind: VariantKind) -> Result<Self, InterfaceError> {
        let (abi, names) = match kind {
            VariantKind::Message => (
                MESSAGE_ABI,
                InterfaceNames {
                    write_function: "storeMessage".to_string(),
                    read_function: "getMessage".to_string(),
                    event: Some("MessageStored".to_string()),
                },
            ),
            VariantKind::Feedback => (
                FEEDBACK_ABI,
                InterfaceNames {
                    write_function: "createFeedback".to_string(),
                    read_function: "getFeedback".to_string(),
                    event: Some("FeedbackCreated".to_string()),
                },
            ),
        };

        Self::custom(abi, &names, VariantLabels::for_kind(kind))
    }

    /// 由任意 ABI 描述和文案构造变体
    ///
    /// # 参数
    /// - `abi_json` - 合约 ABI 描述
    /// - `names` - 接口中写入函数、读取函数和事件的名称
    /// - `labels` - 界面文案
    ///
    /// # 错误
    /// 接口校验失败时返回 [`InterfaceError`]
    pub fn custom(
        abi_json: &str,
        names: &InterfaceNames,
        labels: VariantLabels,
    ) -> Result<Self, InterfaceError> {
        Ok(Self {
            labels,
            interface: Arc::new(ContractInterface::from_json(abi_json, names)?),
        })
    }

    pub fn labels(&self) -> &VariantLabels {
        &self.labels
    }

    pub fn interface(&self) -> &ContractInterface {
        &self.interface
    }

    pub fn shared_interface(&self) -> Arc<ContractInterface> {
        Arc::clone(&self.interface)
    }
}
