//! 平台相关的环境探测
//!
//! Windows 实现走注册表 / Win32；其他平台一律返回 `"Unknown"`，
//! 与探测失败时的降级行为一致。所有探测都是尽力而为的只读操作，
//! 任何失败都不会向上抛错。

#[cfg(target_os = "windows")]
pub use win::{default_printer, last_reboot_time, logon_time, os_friendly_name};

#[cfg(not(target_os = "windows"))]
pub use stub::{default_printer, last_reboot_time, logon_time, os_friendly_name};

#[cfg(target_os = "windows")]
mod win {
    use chrono::{Local, TimeZone};
    use windows::Win32::Foundation::{CloseHandle, ERROR_SUCCESS, FILETIME};
    use windows::Win32::Graphics::Printing::GetDefaultPrinterW;
    use windows::Win32::System::ProcessStatus::EnumProcesses;
    use windows::Win32::System::Registry::{HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ, RegGetValueW};
    use windows::Win32::System::SystemInformation::GetTickCount64;
    use windows::Win32::System::Threading::{
        GetProcessTimes, OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
        QueryFullProcessImageNameW,
    };
    use windows::core::{PCWSTR, PWSTR};

    const CURRENT_VERSION_KEY: &str = "SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion";

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn read_registry_string(subkey: &str, value: &str) -> Option<String> {
        let subkey_wide = to_wide(subkey);
        let value_wide = to_wide(value);
        let mut size: u32 = 0;

        unsafe {
            let status = RegGetValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(subkey_wide.as_ptr()),
                PCWSTR(value_wide.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&mut size),
            );
            if status != ERROR_SUCCESS || size == 0 {
                return None;
            }

            let mut buffer = vec![0u16; (size as usize).div_ceil(2)];
            let status = RegGetValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(subkey_wide.as_ptr()),
                PCWSTR(value_wide.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                Some(buffer.as_mut_ptr() as *mut core::ffi::c_void),
                Some(&mut size),
            );
            if status != ERROR_SUCCESS {
                return None;
            }

            if let Some(pos) = buffer.iter().position(|&c| c == 0) {
                buffer.truncate(pos);
            }
            Some(String::from_utf16_lossy(&buffer))
        }
    }

    /// 操作系统友好名："Windows 11 (Build 26100)" 形式。
    /// Build >= 22000 判为 Windows 11，沿用微软自己的版本划分。
    pub fn os_friendly_name() -> String {
        let Some(build_raw) = read_registry_string(CURRENT_VERSION_KEY, "CurrentBuildNumber")
        else {
            return "Windows".to_string();
        };
        let Ok(build) = build_raw.trim().parse::<u32>() else {
            return "Windows".to_string();
        };

        let os_name = if build >= 22000 {
            "Windows 11"
        } else {
            "Windows 10"
        };
        format!("{} (Build {})", os_name, build)
    }

    /// 上次重启时间：当前时刻减去系统运行毫秒数。
    pub fn last_reboot_time() -> String {
        let uptime_ms = unsafe { GetTickCount64() };
        let boot = Local::now() - chrono::Duration::milliseconds(uptime_ms as i64);
        boot.format("%Y-%m-%d %H:%M").to_string()
    }

    fn filetime_to_local(ft: &FILETIME) -> Option<chrono::DateTime<Local>> {
        let ticks = ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64;
        if ticks == 0 {
            return None;
        }
        // FILETIME 纪元为 1601-01-01，单位 100ns
        let unix_secs = (ticks / 10_000_000).checked_sub(11_644_473_600)?;
        Local.timestamp_opt(unix_secs as i64, 0).single()
    }

    fn process_image_name(handle: windows::Win32::Foundation::HANDLE) -> Option<String> {
        let mut buffer = vec![0u16; 1024];
        let mut len = buffer.len() as u32;
        unsafe {
            QueryFullProcessImageNameW(
                handle,
                PROCESS_NAME_WIN32,
                PWSTR(buffer.as_mut_ptr()),
                &mut len,
            )
            .ok()?;
        }
        buffer.truncate(len as usize);
        Some(String::from_utf16_lossy(&buffer))
    }

    /// 登录时间：取最早启动的 explorer.exe 的创建时间近似。
    pub fn logon_time() -> String {
        let mut pids = vec![0u32; 4096];
        let mut needed: u32 = 0;

        unsafe {
            if EnumProcesses(
                pids.as_mut_ptr(),
                (pids.len() * std::mem::size_of::<u32>()) as u32,
                &mut needed,
            )
            .is_err()
            {
                return "Unknown".to_string();
            }
        }
        pids.truncate(needed as usize / std::mem::size_of::<u32>());

        let mut earliest: Option<chrono::DateTime<Local>> = None;
        for pid in pids {
            if pid == 0 {
                continue;
            }

            let Ok(handle) =
                (unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) })
            else {
                continue;
            };

            let is_explorer = process_image_name(handle)
                .map(|name| {
                    name.rsplit('\\')
                        .next()
                        .map(|base| base.eq_ignore_ascii_case("explorer.exe"))
                        .unwrap_or(false)
                })
                .unwrap_or(false);

            if is_explorer {
                let mut creation = FILETIME::default();
                let mut exit = FILETIME::default();
                let mut kernel = FILETIME::default();
                let mut user = FILETIME::default();
                let times_ok = unsafe {
                    GetProcessTimes(handle, &mut creation, &mut exit, &mut kernel, &mut user)
                        .is_ok()
                };
                if times_ok {
                    if let Some(started) = filetime_to_local(&creation) {
                        earliest = Some(match earliest {
                            Some(current) if current <= started => current,
                            _ => started,
                        });
                    }
                }
            }

            unsafe {
                let _ = CloseHandle(handle);
            }
        }

        earliest
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// 默认打印机全名。
    pub fn default_printer() -> String {
        let mut chars: u32 = 0;
        unsafe {
            let _ = GetDefaultPrinterW(PWSTR::null(), &mut chars);
            if chars == 0 {
                return "Unknown".to_string();
            }

            let mut buffer = vec![0u16; chars as usize];
            if GetDefaultPrinterW(PWSTR(buffer.as_mut_ptr()), &mut chars).is_err() {
                return "Unknown".to_string();
            }

            if let Some(pos) = buffer.iter().position(|&c| c == 0) {
                buffer.truncate(pos);
            }
            String::from_utf16_lossy(&buffer)
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod stub {
    pub fn os_friendly_name() -> String {
        "Unknown".to_string()
    }

    pub fn last_reboot_time() -> String {
        "Unknown".to_string()
    }

    pub fn logon_time() -> String {
        "Unknown".to_string()
    }

    pub fn default_printer() -> String {
        "Unknown".to_string()
    }
}
