//! 剪贴板管理模块
//!
//! # 设计思路
//!
//! 统一管理剪贴板相关的核心能力：
//! - **原生写入**：CF_UNICODETEXT 单格式文本写入，所有权移交语义见 [`writer`]
//! - **争用吸收**：有界指数退避重试，等待期间协作式挂起不阻塞 UI
//! - **前置优化**：写入前尽力把窗口带到前台并稍作等待，提升
//!   `OpenClipboard` 的成功率；失败被吞掉，不影响正确性
//!
//! # 实现思路
//!
//! - 空文本在获取剪贴板之前即被拒绝（前置校验，不重试）。
//! - 重试参数来自 [`crate::settings`]，参考值：10 次 / 80ms 起步 / 800ms 封顶。
//! - command 统一返回 `Result<(), AppError>`，失败信息供前端弹窗展示。

pub mod writer;

use std::time::Duration;

pub use writer::{ClipboardSink, RetryPolicy, SystemClipboard};

use crate::error::AppError;
use crate::settings;
use crate::sysinfo;

/// 取出窗口的原生句柄作为剪贴板属主。
pub(crate) fn owner_handle(window: &tauri::WebviewWindow) -> Option<isize> {
    #[cfg(target_os = "windows")]
    {
        window.hwnd().ok().map(|h| h.0 as isize)
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = window;
        None
    }
}

/// 尽力把窗口带到前台。失败只记录日志，不向上传播。
pub(crate) fn nudge_foreground(window: &tauri::WebviewWindow) {
    if let Err(err) = window.unminimize() {
        log::debug!("前置窗口失败（unminimize）: {}", err);
    }
    if let Err(err) = window.set_focus() {
        log::debug!("前置窗口失败（focus）: {}", err);
    }

    #[cfg(target_os = "windows")]
    if let Ok(hwnd) = window.hwnd() {
        writer::bring_to_foreground(hwnd.0 as isize);
    }
}

async fn copy_with_policy(window: &tauri::WebviewWindow, text: &str) -> Result<(), AppError> {
    let app_settings = settings::current();

    nudge_foreground(window);
    tokio::time::sleep(Duration::from_millis(app_settings.foreground_settle_ms)).await;

    let owner = owner_handle(window);
    if writer::set(owner, text, &app_settings.retry_policy()).await {
        Ok(())
    } else {
        Err(AppError::Clipboard(
            "多次尝试后仍无法写入剪贴板".to_string(),
        ))
    }
}

// ============================================================================
// 复制系统信息快照
// ============================================================================

/// 采集系统信息快照并复制到剪贴板（"Copy" 按钮）。
///
/// # 返回
/// - `Ok(())`：剪贴板此刻恰好包含快照文本
/// - `Err(msg)`：重试耗尽，前端据此弹出错误提示
#[tauri::command]
pub async fn copy_snapshot_to_clipboard(window: tauri::WebviewWindow) -> Result<(), AppError> {
    let text = sysinfo::collect().clipboard_text();
    copy_with_policy(&window, &text).await
}

// ============================================================================
// 写入任意文本
// ============================================================================

/// 将纯文本写入剪贴板，带争用重试。
#[tauri::command]
pub async fn write_text_to_clipboard(
    window: tauri::WebviewWindow,
    text: String,
) -> Result<(), AppError> {
    copy_with_policy(&window, &text).await
}
