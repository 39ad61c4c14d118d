//! # 业务逻辑服务模块
//!
//! 包含核心业务逻辑的实现，与 Tauri command 层解耦：
//! - `rpc` - JSON-RPC 报文与以太坊交易/回执结构
//! - `errors` - 错误类型及面向用户的错误消息提取
//! - `wallet` - 钱包提供者接缝与连接流程
//! - `contract` - 合约接口校验与绑定
//! - `variant` - "消息" / "反馈" 组件变体
//! - `operations` - 写入与读取操作
//! - `session` - 会话状态机
//! - `config` - 配置加载

pub mod config;
pub mod contract;
pub mod errors;
pub mod operations;
pub mod rpc;
pub mod session;
pub mod variant;
pub mod wallet;

#[cfg(test)]
pub mod testing;
