//! # 剪贴板写入模块
//!
//! ## 设计思路
//!
//! 剪贴板是全局独占资源，经常被其他进程（监控类软件、远程桌面）短暂占用，
//! `OpenClipboard` / `SetClipboardData` 的失败大多是瞬时的。
//! 因此单次写入只做最短路径 Open→Empty→Set→Close（持锁 < 1ms），
//! 失败交给外层的有界指数退避重试吸收。
//!
//! ## 实现思路（Windows 原生 CF_UNICODETEXT 写入）
//!
//! - 打开剪贴板后的释放通过 RAII `ClipboardGuard` 保证：任何提前返回
//!   路径都会在离开作用域时 `CloseClipboard`，不存在漏释放的分支。
//! - 全局内存块由 `GlobalTextBuffer` 包装：`SetClipboardData` 成功后
//!   所有权移交系统，本地不再释放；失败则 `Drop` 时 `GlobalFree`。
//!   双重释放与悬垂句柄在结构上不可能发生。
//! - 重试间隔使用 `tokio::time::sleep` 协作式挂起，等待期间不阻塞
//!   事件循环，UI 仍可渲染后续的失败提示。
//! - 单次写入抽象为 [`ClipboardSink`]，测试用脚本化实现验证重试计数。
//!
//! 非 Windows 平台回退到 arboard。

use std::time::Duration;

use crate::settings;

/// 单次写入失败的分类。
///
/// 仅用于日志与诊断：占用类与资源类失败在重试循环中同等对待，
/// 循环总是跑满预算，调用方只见统一的失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipboardFailureKind {
    Busy,
    Transient,
}

/// 单次剪贴板写入的失败信息。
#[derive(Debug, Clone)]
pub struct ClipboardWriteFailure {
    kind: ClipboardFailureKind,
    message: String,
}

impl ClipboardWriteFailure {
    /// 剪贴板被其他进程占用。
    pub fn busy(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Busy,
            message: message.into(),
        }
    }

    /// 瞬时资源失败，如内存分配。
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Transient,
            message: message.into(),
        }
    }
}

/// 剪贴板重试策略。默认值见 [`settings::AppSettings`]。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次）。
    pub max_attempts: u32,
    /// 首次重试前的等待时间（毫秒）。
    pub initial_delay_ms: u64,
    /// 退避延迟上限（毫秒）。
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        settings::AppSettings::default().retry_policy()
    }
}

/// 计算第 `attempt` 次失败后的退避延迟：逐次翻倍，封顶于 `max_delay_ms`。
///
/// `attempt` 为刚失败的尝试序号（从 1 开始）。
fn compute_backoff_delay(initial_delay_ms: u64, attempt: u32, max_delay_ms: u64) -> u64 {
    let exp = initial_delay_ms.saturating_mul(1_u64 << attempt.saturating_sub(1).min(16));
    exp.min(max_delay_ms.max(initial_delay_ms))
}

/// 单次剪贴板写入的抽象。
///
/// 生产实现为 [`SystemClipboard`]；测试注入脚本化实现以验证
/// 尝试次数与重试边界。
pub trait ClipboardSink: Send {
    /// 尝试把 `text` 作为剪贴板唯一内容写入一次，不做任何重试。
    fn write_text(
        &mut self,
        owner: Option<isize>,
        text: &str,
    ) -> Result<(), ClipboardWriteFailure>;
}

/// 系统剪贴板（按平台分派到原生实现）。
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_text(
        &mut self,
        owner: Option<isize>,
        text: &str,
    ) -> Result<(), ClipboardWriteFailure> {
        #[cfg(target_os = "windows")]
        {
            win32::set_clipboard_text(owner, text)
        }

        #[cfg(not(target_os = "windows"))]
        {
            fallback::set_clipboard_text(owner, text)
        }
    }
}

/// 带重试地把 `text` 写入系统剪贴板。
///
/// 返回 `true` 表示剪贴板此刻恰好包含 `text`；
/// 返回 `false` 覆盖所有失败子因（空文本、占用、分配失败、重试耗尽），
/// 调用方统一按“复制失败”处理。
pub async fn set(owner: Option<isize>, text: &str, policy: &RetryPolicy) -> bool {
    write_text_with_retry(&mut SystemClipboard, owner, text, policy).await
}

/// 重试循环本体。尝试之间严格串行：上一次的剪贴板持有
/// 一定已经释放（RAII），下一次才会开始。
pub async fn write_text_with_retry(
    sink: &mut dyn ClipboardSink,
    owner: Option<isize>,
    text: &str,
    policy: &RetryPolicy,
) -> bool {
    if text.is_empty() {
        log::warn!("🚫 拒绝写入空文本，不尝试获取剪贴板");
        return false;
    }

    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match sink.write_text(owner, text) {
            Ok(()) => {
                log::info!("✅ 剪贴板写入成功 (尝试 {})", attempt);
                return true;
            }
            Err(failure) => {
                log::warn!(
                    "❌ 尝试 {}/{} 失败: {}（kind={:?}）",
                    attempt,
                    max_attempts,
                    failure.message,
                    failure.kind
                );

                if attempt == max_attempts {
                    break;
                }

                let wait_ms =
                    compute_backoff_delay(policy.initial_delay_ms, attempt, policy.max_delay_ms);
                log::debug!("🔄 等待 {}ms 后重试（指数退避）", wait_ms);
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            }
        }
    }

    log::warn!("⏱️ 重试次数耗尽（{} 次），放弃写入", max_attempts);
    false
}

// ============================================================================
// Windows 原生实现 — CF_UNICODETEXT + 全局内存所有权移交
// ============================================================================

#[cfg(target_os = "windows")]
mod win32 {
    use super::ClipboardWriteFailure;
    use std::ptr::copy_nonoverlapping;
    use windows::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_BUSY, ERROR_CLIPBOARD_NOT_OPEN, GlobalFree, HANDLE, HWND,
    };
    use windows::Win32::System::DataExchange::{
        CloseClipboard, EmptyClipboard, OpenClipboard, SetClipboardData,
    };
    use windows::Win32::System::Memory::{GHND, GlobalAlloc, GlobalLock, GlobalUnlock, HGLOBAL};
    use windows::Win32::System::Ole::CF_UNICODETEXT;
    use windows::Win32::UI::WindowsAndMessaging::{
        BringWindowToTop, SW_RESTORE, SetForegroundWindow, ShowWindow,
    };

    /// 剪贴板占有权的 RAII 守卫。
    ///
    /// `open` 成功即持有剪贴板，`Drop` 无条件 `CloseClipboard`，
    /// 所有提前返回路径共享同一条释放出口。
    struct ClipboardGuard;

    impl ClipboardGuard {
        fn open(owner: Option<isize>) -> Result<Self, ClipboardWriteFailure> {
            let hwnd = owner.map(|raw| HWND(raw as *mut core::ffi::c_void));
            unsafe {
                OpenClipboard(hwnd).map_err(|e| classify_win32_error("OpenClipboard", &e))?;
            }
            Ok(Self)
        }

        fn clear(&self) -> Result<(), ClipboardWriteFailure> {
            unsafe { EmptyClipboard().map_err(|e| classify_win32_error("EmptyClipboard", &e)) }
        }
    }

    impl Drop for ClipboardGuard {
        fn drop(&mut self) {
            unsafe {
                let _ = CloseClipboard();
            }
        }
    }

    /// 可移动全局内存块，内容为 UTF-16 文本 + 终止符。
    ///
    /// `into_clipboard` 成功后所有权归系统剪贴板，`Drop` 不再释放；
    /// 其余情况（分配后任何失败）由 `Drop` 统一 `GlobalFree`。
    struct GlobalTextBuffer {
        handle: HGLOBAL,
        transferred: bool,
    }

    impl GlobalTextBuffer {
        fn from_text(text: &str) -> Result<Self, ClipboardWriteFailure> {
            let units: Vec<u16> = text.encode_utf16().collect();
            // UTF-16 码元 + 1 个终止符，每个 2 字节；GHND 分配即零初始化
            let bytes = (units.len() + 1) * 2;

            unsafe {
                let handle =
                    GlobalAlloc(GHND, bytes).map_err(|e| classify_win32_error("GlobalAlloc", &e))?;
                let buffer = Self {
                    handle,
                    transferred: false,
                };

                let ptr = GlobalLock(handle) as *mut u16;
                if ptr.is_null() {
                    return Err(ClipboardWriteFailure::transient("GlobalLock 返回空指针"));
                }

                copy_nonoverlapping(units.as_ptr(), ptr, units.len());
                *ptr.add(units.len()) = 0;
                let _ = GlobalUnlock(handle);

                Ok(buffer)
            }
        }

        fn into_clipboard(mut self, format: u32) -> Result<(), ClipboardWriteFailure> {
            unsafe {
                match SetClipboardData(format, Some(HANDLE(self.handle.0))) {
                    Ok(_) => {
                        // 所有权已移交系统，本地句柄作废
                        self.transferred = true;
                        Ok(())
                    }
                    Err(e) => Err(classify_win32_error("SetClipboardData", &e)),
                }
            }
        }
    }

    impl Drop for GlobalTextBuffer {
        fn drop(&mut self) {
            if !self.transferred {
                unsafe {
                    let _ = GlobalFree(Some(self.handle));
                }
            }
        }
    }

    /// 单次写入：Open→Empty→Alloc/Copy→Set→Close。
    ///
    /// 此函数内不做任何等待，只做内存拷贝与 Win32 调用，
    /// 持有剪贴板的时间通常 < 1ms。
    pub(super) fn set_clipboard_text(
        owner: Option<isize>,
        text: &str,
    ) -> Result<(), ClipboardWriteFailure> {
        let guard = ClipboardGuard::open(owner)?;
        guard.clear()?;

        let buffer = GlobalTextBuffer::from_text(text)?;
        buffer.into_clipboard(CF_UNICODETEXT.0 as u32)
        // guard 离开作用域时 CloseClipboard，失败路径亦然
    }

    /// 尽力把所属窗口带到前台，提升 `OpenClipboard` 的成功率。
    /// 失败被吞掉：前置只是优化，不影响写入的正确性。
    pub(crate) fn bring_to_foreground(owner: isize) {
        let hwnd = HWND(owner as *mut core::ffi::c_void);
        unsafe {
            let _ = ShowWindow(hwnd, SW_RESTORE);
            let _ = BringWindowToTop(hwnd);
            let _ = SetForegroundWindow(hwnd);
        }
    }

    fn hresult_to_win32_code(hr: i32) -> Option<u32> {
        let value = hr as u32;
        if (value & 0xFFFF_0000) == 0x8007_0000 {
            Some(value & 0xFFFF)
        } else {
            None
        }
    }

    fn classify_win32_error(operation: &str, err: &windows::core::Error) -> ClipboardWriteFailure {
        let hr = err.code().0;
        let code = hresult_to_win32_code(hr);
        let message = format!("{} 失败: hr=0x{:08X} detail={:?}", operation, hr as u32, err);

        match code {
            Some(c)
                if c == ERROR_ACCESS_DENIED.0
                    || c == ERROR_CLIPBOARD_NOT_OPEN.0
                    || c == ERROR_BUSY.0 =>
            {
                ClipboardWriteFailure::busy(message)
            }
            // 其余错误码（内存不足、未识别的 HRESULT）按瞬时处理，
            // 与争用走同一条重试路径
            _ => ClipboardWriteFailure::transient(message),
        }
    }
}

#[cfg(target_os = "windows")]
pub(crate) use win32::bring_to_foreground;

// ============================================================================
// 非 Windows 回退方案 — 沿用 arboard
// ============================================================================

#[cfg(not(target_os = "windows"))]
mod fallback {
    use super::ClipboardWriteFailure;

    pub(super) fn set_clipboard_text(
        _owner: Option<isize>,
        text: &str,
    ) -> Result<(), ClipboardWriteFailure> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ClipboardWriteFailure::busy(format!("无法访问剪贴板：{}", e)))?;

        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardWriteFailure::transient(format!("写入失败：{}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ClipboardSink, ClipboardWriteFailure, RetryPolicy, compute_backoff_delay,
        write_text_with_retry,
    };

    /// 按脚本依次返回结果的假剪贴板，记录尝试次数。
    struct ScriptedSink {
        script: Vec<Result<(), ClipboardWriteFailure>>,
        attempts: u32,
    }

    impl ScriptedSink {
        fn new(script: Vec<Result<(), ClipboardWriteFailure>>) -> Self {
            Self {
                script: {
                    let mut s = script;
                    s.reverse();
                    s
                },
                attempts: 0,
            }
        }
    }

    impl ClipboardSink for ScriptedSink {
        fn write_text(
            &mut self,
            _owner: Option<isize>,
            _text: &str,
        ) -> Result<(), ClipboardWriteFailure> {
            self.attempts += 1;
            self.script
                .pop()
                .unwrap_or_else(|| Err(ClipboardWriteFailure::busy("script exhausted")))
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay_ms: 1,
            max_delay_ms: 4,
        }
    }

    #[test]
    fn backoff_delays_double_until_cap() {
        let delays: Vec<u64> = (1..=6)
            .map(|attempt| compute_backoff_delay(80, attempt, 800))
            .collect();
        assert_eq!(delays, vec![80, 160, 320, 640, 800, 800]);

        for pair in delays.windows(2) {
            assert!(
                pair[1] >= pair[0],
                "delays must never decrease: {:?}",
                delays
            );
        }
    }

    #[test]
    fn backoff_cap_never_drops_below_initial_delay() {
        assert_eq!(compute_backoff_delay(100, 3, 50), 100);
    }

    #[test]
    fn backoff_survives_large_attempt_numbers() {
        assert_eq!(compute_backoff_delay(80, 64, 800), 800);
    }

    #[tokio::test]
    async fn succeeds_after_contended_attempts() {
        let mut sink = ScriptedSink::new(vec![
            Err(ClipboardWriteFailure::busy("held elsewhere")),
            Err(ClipboardWriteFailure::busy("held elsewhere")),
            Err(ClipboardWriteFailure::busy("held elsewhere")),
            Ok(()),
        ]);

        let ok = write_text_with_retry(&mut sink, None, "hello", &fast_policy(10)).await;

        assert!(ok);
        assert_eq!(sink.attempts, 4, "k failures then success => k+1 attempts");
    }

    #[tokio::test]
    async fn exhausts_attempts_then_reports_failure() {
        let mut sink = ScriptedSink::new(vec![]);

        let ok = write_text_with_retry(&mut sink, None, "hello", &fast_policy(5)).await;

        assert!(!ok);
        assert_eq!(sink.attempts, 5, "exactly max_attempts, no more, no fewer");
    }

    #[tokio::test]
    async fn empty_text_fails_without_touching_clipboard() {
        let mut sink = ScriptedSink::new(vec![Ok(())]);

        let ok = write_text_with_retry(&mut sink, None, "", &fast_policy(10)).await;

        assert!(!ok);
        assert_eq!(sink.attempts, 0, "empty payload must not acquire clipboard");
    }

    #[tokio::test]
    async fn mixed_failure_kinds_still_exhaust_the_full_budget() {
        let mut sink = ScriptedSink::new(vec![
            Err(ClipboardWriteFailure::busy("held elsewhere")),
            Err(ClipboardWriteFailure::transient("allocation failed")),
            Err(ClipboardWriteFailure::busy("held elsewhere")),
        ]);

        let ok = write_text_with_retry(&mut sink, None, "hello", &fast_policy(3)).await;

        assert!(!ok);
        assert_eq!(sink.attempts, 3, "no failure kind may abort the loop early");
    }

    #[tokio::test]
    async fn resource_failures_are_retried_like_contention() {
        let mut sink = ScriptedSink::new(vec![
            Err(ClipboardWriteFailure::transient("allocation failed")),
            Ok(()),
        ]);

        let ok = write_text_with_retry(&mut sink, None, "hello", &fast_policy(10)).await;

        assert!(ok);
        assert_eq!(sink.attempts, 2);
    }
}
