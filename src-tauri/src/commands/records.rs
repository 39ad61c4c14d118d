//! # 记录 Tauri Commands
//!
//! - `submit_record` - 提交新记录并等待确认
//! - `retrieve_record` - 按 ID 读取记录
//! - `open_author_in_explorer` - 在区块浏览器中打开最近读取记录的作者地址

use tauri::{AppHandle, State};
use tauri_plugin_dialog::MessageDialogKind;
use tauri_plugin_opener::OpenerExt;

use super::{AppSession, notify, report};
use crate::models::record::{RecordView, SubmitView};
use crate::services::session::SubmitOutcome;
use crate::utils::format;

/// 提交新记录
///
/// 交易确认后弹出成功提示，界面据此清空草稿；写入进行中时重复调用直接返回 `ignored`。
///
/// # 参数
/// - `content` - 输入框中的原文
#[tauri::command]
pub async fn submit_record(
    app: AppHandle,
    content: String,
    session: State<'_, AppSession>,
) -> Result<SubmitView, String> {
    match session.submit(&content).await {
        Ok(SubmitOutcome::Confirmed(receipt)) => {
            let success = &session.variant().labels().submit_success;
            let message = match receipt.record_id {
                Some(id) => format!("{} ID: {}", success, id),
                None => success.clone(),
            };
            notify(&app, MessageDialogKind::Info, &message).await;
            Ok(SubmitView::confirmed(&receipt))
        }
        Ok(SubmitOutcome::Ignored) => Ok(SubmitView::ignored()),
        Err(e) => Err(report(&app, e).await),
    }
}

/// 按 ID 读取记录
///
/// # 参数
/// - `id` - 用户输入的 ID 文本，由后端校验
///
/// # 错误
/// ID 无效、记录不存在或调用失败时返回错误；之前展示的记录保持不变
#[tauri::command]
pub async fn retrieve_record(
    app: AppHandle,
    id: String,
    session: State<'_, AppSession>,
) -> Result<RecordView, String> {
    match session.retrieve(&id).await {
        Ok(record) => Ok(RecordView::new(&record, &session.settings().explorer_url)),
        Err(e) => Err(report(&app, e).await),
    }
}

#[tauri::command]
pub async fn open_author_in_explorer(app: AppHandle, session: State<'_, AppSession>) -> Result<(), String> {
    let Some(record) = session.last_record() else {
        return Err(report(&app, "还没有读取任何记录").await);
    };

    let url = format::explorer_address_url(&session.settings().explorer_url, &record.author);
    log::info!("在浏览器中打开 {}", url);
    if let Err(e) = app.opener().open_url(url, None::<&str>) {
        return Err(report(&app, format!("打开区块浏览器失败: {}", e)).await);
    }
    Ok(())
}
