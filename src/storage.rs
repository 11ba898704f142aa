//! 缓存目录管理模块
//!
//! # 设计思路
//!
//! 统一解析打印机缓存的持久化存储路径。缓存是机器级数据
//! （所有用户共享同一份打印机列表），因此优先放在机器级
//! 应用数据根目录下，而不是用户目录。
//!
//! # 实现思路
//!
//! - Windows 上使用 `%ProgramData%\HelpCard`。
//! - 其他平台（或 `%ProgramData%` 缺失时）回退到应用默认数据目录。
//! - 这里只解析路径，不做任何磁盘写入；目录在缓存首次写入时才创建，
//!   未入域的机器列一次打印机不会在盘上留下任何痕迹。

use std::path::PathBuf;

use tauri::AppHandle;
use tauri::Manager;

use crate::error::AppError;

/// 打印机缓存文件名。
pub const PRINTER_CACHE_FILE: &str = "printers.json";

fn machine_data_root() -> Option<PathBuf> {
    if cfg!(windows) {
        std::env::var_os("ProgramData").map(PathBuf::from)
    } else {
        None
    }
}

/// 解析打印机缓存目录。只计算路径，不创建。
///
/// # 参数
/// * `app` - Tauri 应用句柄，用于回退到应用数据目录
///
/// # 返回
/// - `Ok(PathBuf)` — 缓存目录路径
/// - `Err(AppError::Storage)` — 无法解析应用数据目录
pub fn printer_cache_dir(app: &AppHandle) -> Result<PathBuf, AppError> {
    if let Some(root) = machine_data_root() {
        return Ok(root.join("HelpCard"));
    }

    app.path()
        .app_data_dir()
        .map_err(|e| AppError::Storage(format!("获取应用数据目录失败: {}", e)))
}

/// 解析打印机缓存文件完整路径。只计算路径，不创建。
pub fn printer_cache_path(app: &AppHandle) -> Result<PathBuf, AppError> {
    Ok(printer_cache_dir(app)?.join(PRINTER_CACHE_FILE))
}
