//! # 通用工具函数

pub mod format;
pub mod path;
