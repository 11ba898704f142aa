//! # HelpCard — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  前端 (静态页面)                          │
//! │                                                          │
//! │  诊断卡片 ── 打印机选择框 ── 求助按钮                     │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Tauri IPC (Result<T, AppError>)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ sysinfo ──── 一次性环境探测（机器名/IP/OS/打印机）     │
//! │  │                                                       │
//! │  ├─ clipboard ── CF_UNICODETEXT 写入 + 退避重试           │
//! │  │   └─ writer        RAII 持有 + 所有权移交              │
//! │  │                                                       │
//! │  ├─ printers ─── 入域门禁 + TTL 缓存 + spooler 查询       │
//! │  │   ├─ directory     解析链与过滤                        │
//! │  │   ├─ cache         JSON 缓存（整文件替换）             │
//! │  │   ├─ spooler       EnumPrintersW 共享队列              │
//! │  │   └─ install       printui 外部进程映射                │
//! │  │                                                       │
//! │  ├─ support ──── mailto / 帮助门户外呼                    │
//! │  ├─ settings ─── 策略参数（重试/退避/TTL）持久化           │
//! │  └─ storage ──── 机器级缓存目录解析                       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有 Tauri command 的返回类型 |
//! | [`sysinfo`] | 机器诊断快照采集与文本渲染 |
//! | [`clipboard`] | 剪贴板独占获取、所有权移交、争用重试 |
//! | [`printers`] | 打印机目录缓存、过滤、安装 |
//! | [`support`] | IT 求助邮件与帮助门户 |
//! | [`settings`] | 可调策略的载入与持久化 |
//! | [`storage`] | 打印机缓存目录的获取与自动创建 |

pub mod clipboard;
pub mod error;
pub mod printers;
pub mod settings;
pub mod storage;
pub mod support;
pub mod sysinfo;
