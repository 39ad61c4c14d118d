//! # Tauri Command 处理模块
//!
//! 本模块包含所有注册到 Tauri 的 command 处理函数：
//! - `session` - 会话视图和钱包连接
//! - `records` - 记录的写入、读取和在浏览器中查看作者
//!
//! 所有失败都会弹出阻塞式的原生消息框，同时把错误文本返回给前端。

pub mod records;
pub mod session;

use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use crate::services::session::Session;
use crate::services::wallet::HttpWalletProvider;

/// Tauri managed state 中唯一的会话
pub type AppSession = Session<HttpWalletProvider>;

/// 弹出阻塞式消息框，直到用户关闭后才返回
///
/// 消息框在阻塞线程池中显示，不占用异步运行时的工作线程。
pub(crate) async fn notify(app: &AppHandle, kind: MessageDialogKind, message: &str) {
    let app = app.clone();
    let message = message.to_string();
    let shown = tauri::async_runtime::spawn_blocking(move || {
        app.dialog()
            .message(message)
            .title("AnonRecords")
            .kind(kind)
            .blocking_show();
    })
    .await;

    if let Err(e) = shown {
        log::error!("显示消息框失败: {}", e);
    }
}

/// 把错误展示给用户，并返回交给前端的错误文本
pub(crate) async fn report(app: &AppHandle, error: impl std::fmt::Display) -> String {
    let message = error.to_string();
    notify(app, MessageDialogKind::Error, &message).await;
    message
}
