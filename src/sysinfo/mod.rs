//! 系统信息快照模块
//!
//! # 设计思路
//!
//! 帮助台来电时最常被问到的几项机器信息一次性采集成快照：
//! 机器名、当前用户、IP 列表、操作系统、上次重启、登录时间、默认打印机。
//! 全部是一次性的只读探测，没有状态、没有重试；
//! 任何一项失败都降级为 `"Unknown"`，绝不阻塞界面。
//!
//! # 实现思路
//!
//! - 平台相关的探测收敛在 [`platform`]，非 Windows 平台全部退化。
//! - IP 枚举走 `local-ip-address`，只保留非回环 IPv4，按网卡顺序去重。
//! - `clipboard_text` 生成复制 / 邮件正文共用的多行文本，字段顺序固定。

pub mod platform;

use std::net::IpAddr;

use serde::Serialize;

use crate::error::AppError;

/// 一次采集到的机器诊断信息。
#[derive(Debug, Clone, Serialize)]
pub struct SystemSnapshot {
    pub computer_name: String,
    pub user_name: String,
    pub logon_time: String,
    pub default_printer: String,
    pub os_version: String,
    pub last_reboot: String,
    pub ip_addresses: Vec<String>,
}

impl SystemSnapshot {
    /// 渲染复制到剪贴板 / 邮件正文用的多行文本。
    pub fn clipboard_text(&self) -> String {
        format!(
            "Computer Name: {}\nUser: {}\nLogon Time: {}\nPrinter: {}\nOS: {}\nLast Reboot: {}\nIP(s): {}",
            self.computer_name,
            self.user_name,
            self.logon_time,
            self.default_printer,
            self.os_version,
            self.last_reboot,
            self.ip_addresses.join(", ")
        )
    }
}

fn computer_name() -> String {
    std::env::var("COMPUTERNAME")
        .unwrap_or_else(|_| gethostname::gethostname().to_string_lossy().to_string())
}

fn user_name() -> String {
    std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "Unknown".to_string())
}

/// 枚举非回环 IPv4 地址，保持网卡枚举顺序并去重。
fn ip_addresses() -> Vec<String> {
    match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => {
            let mut addresses: Vec<String> = Vec::new();
            for (_name, ip) in interfaces {
                if let IpAddr::V4(v4) = ip {
                    if v4.is_loopback() {
                        continue;
                    }
                    let text = v4.to_string();
                    if !addresses.contains(&text) {
                        addresses.push(text);
                    }
                }
            }
            addresses
        }
        Err(err) => {
            log::warn!("枚举网卡地址失败: {}", err);
            Vec::new()
        }
    }
}

/// 采集当前机器的诊断快照。
pub fn collect() -> SystemSnapshot {
    SystemSnapshot {
        computer_name: computer_name(),
        user_name: user_name(),
        logon_time: platform::logon_time(),
        default_printer: platform::default_printer(),
        os_version: platform::os_friendly_name(),
        last_reboot: platform::last_reboot_time(),
        ip_addresses: ip_addresses(),
    }
}

/// 返回系统信息快照（窗口加载时调用一次）。
#[tauri::command]
pub fn system_snapshot() -> Result<SystemSnapshot, AppError> {
    Ok(collect())
}

#[cfg(test)]
mod tests {
    use super::SystemSnapshot;

    #[test]
    fn clipboard_text_renders_all_fields_in_fixed_order() {
        let snapshot = SystemSnapshot {
            computer_name: "WS-042".to_string(),
            user_name: "jdoe".to_string(),
            logon_time: "2026-08-04 08:01".to_string(),
            default_printer: "\\\\PrintServer\\Floor2".to_string(),
            os_version: "Windows 11 (Build 26100)".to_string(),
            last_reboot: "2026-08-03 18:30".to_string(),
            ip_addresses: vec!["10.0.0.5".to_string(), "192.168.1.7".to_string()],
        };

        let text = snapshot.clipboard_text();
        assert_eq!(
            text,
            "Computer Name: WS-042\n\
             User: jdoe\n\
             Logon Time: 2026-08-04 08:01\n\
             Printer: \\\\PrintServer\\Floor2\n\
             OS: Windows 11 (Build 26100)\n\
             Last Reboot: 2026-08-03 18:30\n\
             IP(s): 10.0.0.5, 192.168.1.7"
        );
    }

    #[test]
    fn clipboard_text_with_no_addresses_keeps_the_line() {
        let snapshot = SystemSnapshot {
            computer_name: "WS-042".to_string(),
            user_name: "jdoe".to_string(),
            logon_time: "Unknown".to_string(),
            default_printer: "Unknown".to_string(),
            os_version: "Unknown".to_string(),
            last_reboot: "Unknown".to_string(),
            ip_addresses: Vec::new(),
        };

        assert!(snapshot.clipboard_text().ends_with("IP(s): "));
    }
}
