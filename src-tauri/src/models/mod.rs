//! # 数据模型模块
//!
//! 定义了与前端 TypeScript 类型一一对应的 Rust 数据结构：
//! - `record` - 合约记录、写入结果及其展示形式
//! - `session` - 会话状态和界面视图
//! - `config` - 应用配置文件

pub mod config;
pub mod record;
pub mod session;
