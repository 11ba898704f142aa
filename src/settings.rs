//! # 应用设置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `AppSettings`，保证运行时行为可观测、可调整、可测试。
//! 重试次数、退避延迟、缓存 TTL 等参考值只是默认策略，不是协议常量。
//!
//! ## 实现思路
//!
//! - `Default` 提供与参考行为一致的生产配置。
//! - 设置以 JSON 形式持久化在应用数据目录的 `settings.json`。
//! - 运行时生效的设置保存在全局 `RwLock`，各模块通过 [`current`] 读取快照。
//! - 字段级 `#[serde(default)]`，旧版本设置文件缺字段时回退默认值而不报错。

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager};

use crate::clipboard::RetryPolicy;
use crate::error::AppError;

/// 应用设置。
///
/// 字段覆盖了打印机目录、剪贴板重试与求助入口三个方面。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 打印服务器名（UNC 形式，如 `\\PrintServer`）。
    pub print_server: String,
    /// 打印机缓存的有效期（小时）。
    pub printer_cache_ttl_hours: u64,
    /// 剪贴板写入最大尝试次数。
    pub clipboard_max_attempts: u32,
    /// 首次重试前的等待时间（毫秒），之后逐次翻倍。
    pub clipboard_initial_delay_ms: u64,
    /// 单次退避延迟上限（毫秒）。
    pub clipboard_max_delay_ms: u64,
    /// 前置窗口后等待焦点稳定的时间（毫秒）。
    pub foreground_settle_ms: u64,
    /// IT 求助邮箱。
    pub help_desk_email: String,
    /// 帮助门户地址。
    pub help_portal_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            print_server: "\\\\PrintServer".to_string(),
            printer_cache_ttl_hours: 24,
            clipboard_max_attempts: 10,
            clipboard_initial_delay_ms: 80,
            clipboard_max_delay_ms: 800,
            foreground_settle_ms: 60,
            help_desk_email: "it@pullmanregionalhospital.freshservice.com".to_string(),
            help_portal_url: "https://access.providence.org/".to_string(),
        }
    }
}

impl AppSettings {
    /// 提取剪贴板重试策略。
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.clipboard_max_attempts,
            initial_delay_ms: self.clipboard_initial_delay_ms,
            max_delay_ms: self.clipboard_max_delay_ms,
        }
    }
}

/// 运行时生效的设置。启动时由 [`init`] 从磁盘载入。
static SETTINGS: Lazy<RwLock<AppSettings>> = Lazy::new(|| RwLock::new(AppSettings::default()));

/// 读取当前设置的快照。
pub fn current() -> AppSettings {
    SETTINGS
        .read()
        .map(|guard| guard.clone())
        .unwrap_or_default()
}

fn replace(settings: AppSettings) {
    if let Ok(mut guard) = SETTINGS.write() {
        *guard = settings;
    }
}

fn settings_file_path(app: &AppHandle) -> Result<PathBuf, AppError> {
    let app_data_dir = app
        .path()
        .app_data_dir()
        .map_err(|e| AppError::Storage(format!("获取应用数据目录失败: {}", e)))?;

    fs::create_dir_all(&app_data_dir)
        .map_err(|e| AppError::Storage(format!("创建应用数据目录失败: {}", e)))?;

    Ok(app_data_dir.join("settings.json"))
}

/// 应用启动时载入持久化设置。
///
/// 文件缺失或损坏时静默回退默认值，设置永远不会阻塞启动。
pub fn init(app: &AppHandle) {
    match settings_file_path(app) {
        Ok(path) if path.exists() => match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<AppSettings>(&content) {
                Ok(settings) => {
                    log::info!("⚙️ 已载入设置: {}", path.display());
                    replace(settings);
                }
                Err(err) => {
                    log::warn!("设置文件解析失败，使用默认值: {}", err);
                }
            },
            Err(err) => {
                log::warn!("设置文件读取失败，使用默认值: {}", err);
            }
        },
        Ok(_) => {
            log::debug!("设置文件不存在，使用默认值");
        }
        Err(err) => {
            log::warn!("无法定位设置文件，使用默认值: {}", err);
        }
    }
}

#[tauri::command]
pub fn get_app_settings() -> Result<AppSettings, AppError> {
    Ok(current())
}

#[tauri::command]
pub fn set_app_settings(app: AppHandle, settings: AppSettings) -> Result<(), AppError> {
    let settings_path = settings_file_path(&app)?;

    let content = serde_json::to_string_pretty(&settings)
        .map_err(|e| AppError::Storage(format!("序列化设置失败: {}", e)))?;
    fs::write(settings_path, content)?;

    replace(settings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::AppSettings;

    #[test]
    fn default_settings_match_reference_policy() {
        let settings = AppSettings::default();
        assert_eq!(settings.clipboard_max_attempts, 10);
        assert_eq!(settings.clipboard_initial_delay_ms, 80);
        assert_eq!(settings.clipboard_max_delay_ms, 800);
        assert_eq!(settings.printer_cache_ttl_hours, 24);
        assert_eq!(settings.print_server, "\\\\PrintServer");
    }

    #[test]
    fn partial_settings_file_falls_back_to_defaults() {
        let parsed: AppSettings =
            serde_json::from_str(r#"{ "print_server": "\\\\Spooler01" }"#).expect("parse");
        assert_eq!(parsed.print_server, "\\\\Spooler01");
        assert_eq!(parsed.clipboard_max_attempts, 10);
        assert_eq!(parsed.printer_cache_ttl_hours, 24);
    }
}
