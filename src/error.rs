//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)` 等不一致模式。
//!
//! 所有 `#[tauri::command]` 函数统一返回 `Result<T, AppError>`，
//! 前端通过 `Serialize` 获得结构化的错误信息。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 实现 `Serialize` 将错误序列化为字符串，满足 Tauri IPC 要求。
//! - 错误只终止当前操作：剪贴板失败不影响打印机状态，反之亦然。

use serde::Serialize;

/// 应用级统一错误类型
///
/// 所有 Tauri command 均返回此类型，确保前端收到一致的错误格式。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板写入失败（重试耗尽或前置校验未通过）
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 打印机目录查询 / 选择校验失败
    #[error("打印机操作失败: {0}")]
    Printer(String),

    /// 外部程序调用失败（printui、浏览器、邮件客户端）
    #[error("外部程序调用失败: {0}")]
    Shell(String),

    /// 缓存 / 设置目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

/// Tauri IPC 要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
