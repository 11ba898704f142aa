//! 网络打印机安装（printui 外部进程）
//!
//! 选定规范路径后交给系统自带的
//! `rundll32.exe printui.dll,PrintUIEntry` 完成映射，
//! 可选地再调用一次 `/y` 设为默认打印机。
//! 本模块只负责校验选择并等待进程退出，安装本身的 UI 与驱动
//! 协商都由系统组件处理。

use crate::error::AppError;

/// 安装（映射）一台网络打印机，必要时设为默认。
///
/// # 参数
/// * `canonical_path` - UNC 规范路径（`\\server\share`）
/// * `set_as_default` - 安装后是否设为默认打印机
pub fn install_printer(canonical_path: &str, set_as_default: bool) -> Result<(), AppError> {
    let path = canonical_path.trim();
    if path.is_empty() {
        return Err(AppError::Printer("请选择有效的打印机".to_string()));
    }
    // 路径会拼进命令行，拒绝引号以免被拆成多个参数
    if path.contains('"') {
        return Err(AppError::Printer(format!("打印机路径包含非法字符: {}", path)));
    }

    log::info!("🖨️ 安装打印机: {}", path);
    run_printui(&["printui.dll,PrintUIEntry", "/in", "/n", path])?;

    if set_as_default {
        log::info!("⭐ 设为默认打印机: {}", path);
        run_printui(&["printui.dll,PrintUIEntry", "/y", "/n", path])?;
    }

    Ok(())
}

#[cfg(target_os = "windows")]
fn run_printui(args: &[&str]) -> Result<(), AppError> {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    let status = std::process::Command::new("rundll32.exe")
        .args(args)
        .creation_flags(CREATE_NO_WINDOW)
        .status()
        .map_err(|e| AppError::Shell(format!("启动 rundll32 失败: {}", e)))?;

    if !status.success() {
        return Err(AppError::Shell(format!("printui 退出状态异常: {}", status)));
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run_printui(_args: &[&str]) -> Result<(), AppError> {
    Err(AppError::Printer(
        "打印机安装仅支持 Windows".to_string(),
    ))
}
