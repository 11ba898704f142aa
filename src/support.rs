//! 求助入口模块
//!
//! # 设计思路
//!
//! 两个一次性的外呼动作：给 IT 发邮件、打开帮助门户。
//! 都是简单的外部程序调用，失败只提示本次操作，不影响其他功能。
//! 邮件客户端打不开时回退为把正文复制到剪贴板，用户可手动粘贴 ——
//! 回退路径复用剪贴板重试机制。

use tauri_plugin_shell::ShellExt;

use crate::clipboard;
use crate::error::AppError;
use crate::settings;
use crate::sysinfo;

/// `email_help_desk` 的结果：邮件客户端已打开，或回退为复制正文。
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailOutcome {
    Opened,
    CopiedToClipboard,
}

// ============================================================================
// 给 IT 发求助邮件
// ============================================================================

/// 组装带系统快照正文的 mailto 链接并打开邮件客户端。
///
/// # 返回
/// - `Ok(Opened)`：邮件客户端已接管
/// - `Ok(CopiedToClipboard)`：客户端打不开，正文已复制到剪贴板
/// - `Err(msg)`：两条路径都失败
#[tauri::command]
pub async fn email_help_desk(
    app: tauri::AppHandle,
    window: tauri::WebviewWindow,
) -> Result<EmailOutcome, AppError> {
    let app_settings = settings::current();
    let body_text = format!("\n\n{}", sysinfo::collect().clipboard_text());

    let mailto = format!(
        "mailto:{}?subject={}&body={}",
        app_settings.help_desk_email,
        urlencoding::encode("I.T. Help Request"),
        urlencoding::encode(&body_text)
    );

    match app.shell().open(mailto, None) {
        Ok(()) => Ok(EmailOutcome::Opened),
        Err(err) => {
            log::warn!("打开邮件客户端失败，回退为复制到剪贴板: {}", err);

            let owner = clipboard::owner_handle(&window);
            if clipboard::writer::set(owner, &body_text, &app_settings.retry_policy()).await {
                Ok(EmailOutcome::CopiedToClipboard)
            } else {
                Err(AppError::Shell(format!("无法打开邮件客户端: {}", err)))
            }
        }
    }
}

// ============================================================================
// 打开帮助门户
// ============================================================================

/// 打开帮助门户，Windows 上优先使用已安装的 Chrome。
#[tauri::command]
pub async fn open_help_portal(app: tauri::AppHandle) -> Result<(), AppError> {
    let url = settings::current().help_portal_url;

    #[cfg(target_os = "windows")]
    {
        const CHROME_PATHS: [&str; 2] = [
            "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
            "C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe",
        ];

        for chrome in CHROME_PATHS {
            if std::path::Path::new(chrome).exists() {
                return std::process::Command::new(chrome)
                    .arg(&url)
                    .spawn()
                    .map(|_| ())
                    .map_err(|e| AppError::Shell(format!("启动 Chrome 失败: {}", e)));
            }
        }
    }

    app.shell()
        .open(url, None)
        .map_err(|e| AppError::Shell(format!("打开帮助门户失败: {}", e)))
}
