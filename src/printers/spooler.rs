//! 打印服务器共享队列查询（Win32 spooler）
//!
//! # 实现思路
//!
//! - `EnumPrintersW` 两段式调用：先探测所需缓冲区大小，再取 level-2 信息。
//! - 只保留带共享属性的队列；优先用 `\\server\share` 组合规范路径，
//!   无共享名时回退到队列全名。
//! - 失败（服务器不可达、拒绝访问、协议错误）统一折叠为一条
//!   `AppError::Printer`，由上层降级为空列表 + 警告。
//!
//! 非 Windows 平台没有 spooler，查询直接报错并走同一条降级路径。

use super::directory::DirectoryQuery;
use crate::error::AppError;

/// 基于系统打印后台程序的目录查询。
pub struct SpoolerQuery;

impl DirectoryQuery for SpoolerQuery {
    fn shared_queues(&self, server: &str) -> Result<Vec<String>, AppError> {
        enum_shared_queues(server)
    }
}

#[cfg(target_os = "windows")]
fn enum_shared_queues(server: &str) -> Result<Vec<String>, AppError> {
    use windows::Win32::Graphics::Printing::{
        EnumPrintersW, PRINTER_ATTRIBUTE_SHARED, PRINTER_ENUM_NAME, PRINTER_INFO_2W,
    };
    use windows::core::{PCWSTR, PWSTR};

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn pwstr_to_string(value: PWSTR) -> Option<String> {
        if value.is_null() {
            return None;
        }
        // SAFETY: 非空指针来自 EnumPrintersW 填充的缓冲区，以 NUL 结尾。
        unsafe { value.to_string().ok() }
    }

    let server_wide = to_wide(server);
    let mut needed: u32 = 0;
    let mut returned: u32 = 0;

    unsafe {
        // 第一次调用只探测所需字节数，预期以 ERROR_INSUFFICIENT_BUFFER 失败
        let _ = EnumPrintersW(
            PRINTER_ENUM_NAME,
            PCWSTR(server_wide.as_ptr()),
            2,
            None,
            &mut needed,
            &mut returned,
        );

        if needed == 0 {
            return Err(AppError::Printer(format!(
                "无法枚举 {} 上的打印队列（服务器不可达或无权限）",
                server
            )));
        }

        // 以 u64 分配保证指针对齐，再以字节切片交给 Win32 填充
        let mut raw = vec![0u64; (needed as usize).div_ceil(8)];
        let bytes =
            std::slice::from_raw_parts_mut(raw.as_mut_ptr() as *mut u8, raw.len() * 8);
        EnumPrintersW(
            PRINTER_ENUM_NAME,
            PCWSTR(server_wide.as_ptr()),
            2,
            Some(bytes),
            &mut needed,
            &mut returned,
        )
        .map_err(|e| AppError::Printer(format!("EnumPrintersW 失败: {}", e)))?;

        let infos =
            std::slice::from_raw_parts(raw.as_ptr() as *const PRINTER_INFO_2W, returned as usize);

        let mut paths = Vec::with_capacity(infos.len());
        for info in infos {
            if info.Attributes & PRINTER_ATTRIBUTE_SHARED == 0 {
                continue;
            }

            let canonical = match (
                pwstr_to_string(info.pServerName),
                pwstr_to_string(info.pShareName),
            ) {
                (Some(server_name), Some(share)) if !share.is_empty() => {
                    format!("{}\\{}", server_name, share)
                }
                _ => match pwstr_to_string(info.pPrinterName) {
                    Some(name) => name,
                    None => continue,
                },
            };
            paths.push(canonical);
        }

        Ok(paths)
    }
}

#[cfg(not(target_os = "windows"))]
fn enum_shared_queues(server: &str) -> Result<Vec<String>, AppError> {
    Err(AppError::Printer(format!(
        "当前平台不支持查询打印服务器 {}",
        server
    )))
}
