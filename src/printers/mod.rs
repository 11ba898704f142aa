//! 打印机目录模块
//!
//! # 设计思路
//!
//! 统一管理网络打印机的发现与映射：
//! - **目录解析**：入域门禁 → TTL 缓存 → spooler 查询 → 空列表降级
//! - **过滤**：纯内存的大小写不敏感子串匹配，供选择框即时筛选
//! - **安装**：选定 UNC 后 shell-out 给系统 printui 完成映射
//!
//! # 实现思路
//!
//! - 解析链与门禁在 [`directory`]，身份与查询以 trait 注入便于单测。
//! - 缓存是机器级 JSON 文件（[`crate::storage`]），细节见 [`cache`]。
//! - 目录查询可能跨网络阻塞数秒，command 层放到阻塞线程执行，
//!   不占用异步运行时。

pub mod cache;
pub mod directory;
pub mod install;
pub mod spooler;

use std::time::Duration;

pub use directory::{
    DirectoryQuery, EnvIdentity, MachineIdentity, PrinterDirectory, PrinterEntry, PrinterListing,
};

use crate::error::AppError;
use crate::settings;
use crate::storage;

// ============================================================================
// 列出共享打印机
// ============================================================================

/// 解析当前可用的共享打印机列表。
///
/// # 返回
/// - `printers`：可用条目（可能为空）
/// - `off_domain`：机器未入域，功能不可用
/// - `warning`：目录不可达时的非致命提示文案
#[tauri::command]
pub async fn list_printers(app: tauri::AppHandle) -> Result<PrinterListing, AppError> {
    let app_settings = settings::current();
    let cache_path = storage::printer_cache_path(&app)?;
    let ttl = Duration::from_secs(app_settings.printer_cache_ttl_hours.saturating_mul(3600));

    let printer_directory = PrinterDirectory::new(
        EnvIdentity,
        spooler::SpoolerQuery,
        cache::PrinterCache::new(cache_path, ttl),
        app_settings.print_server,
    );

    tokio::task::spawn_blocking(move || printer_directory.list())
        .await
        .map_err(|e| AppError::Printer(format!("后台查询线程失败: {}", e)))
}

// ============================================================================
// 过滤
// ============================================================================

/// 按用户输入过滤打印机列表（纯内存，无 I/O）。
///
/// 以规范路径为输入重建条目，显示名始终重新推导。
#[tauri::command]
pub fn filter_printer_list(canonical_paths: Vec<String>, query: String) -> Vec<PrinterEntry> {
    let entries: Vec<PrinterEntry> = canonical_paths
        .into_iter()
        .map(PrinterEntry::from_canonical_path)
        .collect();
    directory::filter_printers(&entries, &query)
}

// ============================================================================
// 安装
// ============================================================================

/// 安装选定的网络打印机，可选设为默认。
#[tauri::command]
pub async fn add_printer(canonical_path: String, set_as_default: bool) -> Result<(), AppError> {
    tokio::task::spawn_blocking(move || install::install_printer(&canonical_path, set_as_default))
        .await
        .map_err(|e| AppError::Printer(format!("后台安装线程失败: {}", e)))?
}
