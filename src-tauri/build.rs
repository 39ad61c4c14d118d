//! # Anon Records - Cargo 构建脚本
//!
//! 启用 `desktop` 特性时，由 Tauri 生成运行时所需的资源绑定代码
//! （读取 `tauri.conf.json`、应用图标和权限清单）。
//! 仅编译核心库时无需任何构建前处理。

fn main() {
    #[cfg(feature = "desktop")]
    tauri_build::build()
}
