//! # 会话 Tauri Commands
//!
//! - `get_session_view` - 获取界面渲染所需的会话快照
//! - `connect_wallet` - 请求钱包授权并绑定合约
//!
//! 另外由 [`forward_account_changes`] 把已连接账户的变化以 `account-changed`
//! 事件推送给前端。

use alloy_primitives::Address;
use tauri::{AppHandle, Emitter, State};
use tokio::sync::watch;

use super::{AppSession, report};
use crate::models::session::SessionView;

/// 推送给前端的账户变化事件名，载荷为地址字符串或 `null`
pub const ACCOUNT_CHANGED_EVENT: &str = "account-changed";

#[tauri::command]
pub async fn get_session_view(session: State<'_, AppSession>) -> Result<SessionView, String> {
    Ok(session.view())
}

/// 连接钱包
///
/// 这是交互式调用，在用户于钱包中同意或拒绝之前不会返回。
///
/// # 返回值
/// 连接后的会话快照
///
/// # 错误
/// 没有钱包、用户拒绝或已有连接请求在等待时返回错误，并弹出消息框
#[tauri::command]
pub async fn connect_wallet(app: AppHandle, session: State<'_, AppSession>) -> Result<SessionView, String> {
    match session.connect().await {
        Ok(_) => Ok(session.view()),
        Err(e) => Err(report(&app, e).await),
    }
}

/// 在后台任务中把账户变化转发给前端，会话存在期间一直运行
pub fn forward_account_changes(app: AppHandle, mut account: watch::Receiver<Option<Address>>) {
    tauri::async_runtime::spawn(async move {
        while account.changed().await.is_ok() {
            let current = account.borrow_and_update().map(|a| a.to_string());
            if let Err(e) = app.emit(ACCOUNT_CHANGED_EVENT, current) {
                log::error!("推送账户变化失败: {}", e);
            }
        }
    });
}
