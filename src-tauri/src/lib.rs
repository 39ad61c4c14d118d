//! # AnonRecords - 匿名记录 DApp 客户端
//!
//! 通过外部钱包向已部署的合约提交一段文本，并按 ID 读回文本和作者地址。
//! "消息" 与 "反馈" 两种界面共用同一套实现，仅文案和合约接口不同。
//!
//! ## 架构说明
//! 核心逻辑（`models`、`services`、`utils`）不依赖 Tauri，可以独立编译和测试；
//! 桌面外壳（`commands` 和 [`run`]）在 `desktop` feature 下编译。
//!
//! ## 模块结构
//! - `commands/` - Tauri command 处理函数（IPC 接口层）
//! - `models/` - 数据模型（对应前端 TypeScript 类型）
//! - `services/` - 核心业务逻辑（钱包、合约、会话、配置）
//! - `utils/` - 通用工具函数

#[cfg(feature = "desktop")]
mod commands;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(feature = "desktop")]
use tauri::Manager;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
/// Tauri 应用启动函数
///
/// 1. 注册对话框和 Opener 插件，调试模式下注册日志插件
/// 2. 在 `setup` 钩子中加载配置、构造会话并注册为 managed state
/// 3. 启动账户变化的事件转发
/// 4. 注册所有自定义 Tauri commands
///
/// # Panics
/// 配置无效（如自定义合约接口签名不匹配）或窗口创建失败时，
/// 通过 `.expect()` 触发 panic 并输出错误信息。
pub fn run() {
    tauri::Builder::default()
        // === 官方插件注册 ===
        // 对话框插件：所有错误和成功提示都以原生消息框展示
        .plugin(tauri_plugin_dialog::init())
        // Opener 插件：在系统浏览器中打开区块浏览器链接
        .plugin(tauri_plugin_opener::init())
        // === 自定义 Tauri Commands 注册 ===
        .invoke_handler(tauri::generate_handler![
            commands::session::get_session_view,
            commands::session::connect_wallet,
            commands::records::submit_record,
            commands::records::retrieve_record,
            commands::records::open_author_in_explorer,
        ])
        .setup(|app| {
            // 仅在开发调试模式下启用日志插件
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            // === 会话初始化 ===
            let session = tauri::async_runtime::block_on(async {
                let config = services::config::load_config().await?;
                let config_dir = utils::path::get_app_config_dir()?;
                services::config::build_session(&config, &config_dir).await
            })?;

            commands::session::forward_account_changes(app.handle().clone(), session.subscribe_account());
            app.manage(session);
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
