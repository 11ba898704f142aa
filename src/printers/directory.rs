//! 打印机目录解析
//!
//! # 设计思路
//!
//! 解析顺序固定为：入域门禁 → 新鲜缓存 → 目录查询 → 空列表降级。
//! 未入域的机器立即返回空（不碰文件也不碰网络）；
//! 目录不可达只产生一条用户可见的警告，绝不让选择器崩溃。
//!
//! # 实现思路
//!
//! - 机器身份与目录查询都以 trait 注入（[`MachineIdentity`] /
//!   [`DirectoryQuery`]），门禁分支与回退链可以脱离环境单测。
//! - 显示名是规范路径的纯函数（最后一个 `\` 之后的段），
//!   缓存路径与查询路径共用同一推导，保证两边永不分叉。
//! - 过滤是纯内存操作：大小写不敏感的子串匹配，保持原有顺序。

use serde::Serialize;

use super::cache::PrinterCache;
use crate::error::AppError;

/// 一台共享打印机：网络规范路径 + 推导出的显示名。
///
/// `display_name` 只能经由 [`PrinterEntry::from_canonical_path`] 推导，
/// 不提供独立设置入口。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrinterEntry {
    pub canonical_path: String,
    pub display_name: String,
}

impl PrinterEntry {
    pub fn from_canonical_path(path: impl Into<String>) -> Self {
        let canonical_path = path.into();
        let display_name = derive_display_name(&canonical_path);
        Self {
            canonical_path,
            display_name,
        }
    }
}

/// 从规范路径推导显示名：最后一个 `\` 之后的段，无分隔符时取整串。
pub fn derive_display_name(canonical_path: &str) -> String {
    canonical_path
        .rsplit('\\')
        .next()
        .unwrap_or(canonical_path)
        .to_string()
}

/// 按显示名做大小写不敏感的子串过滤。
///
/// 空白查询原样返回全部条目；命中结果保持源列表顺序。
pub fn filter_printers(entries: &[PrinterEntry], query: &str) -> Vec<PrinterEntry> {
    let needle = query.trim();
    if needle.is_empty() {
        return entries.to_vec();
    }

    let needle = needle.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.display_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// 机器 / 域身份提供者。
///
/// 生产实现读取环境（[`EnvIdentity`]），测试注入固定身份。
pub trait MachineIdentity: Send {
    fn machine_name(&self) -> String;
    fn account_domain(&self) -> String;

    /// 账号域非空且与机器名不同（忽略大小写）即视为已入域。
    fn is_domain_joined(&self) -> bool {
        let domain = self.account_domain();
        !domain.is_empty() && !domain.eq_ignore_ascii_case(&self.machine_name())
    }
}

/// 从环境变量读取身份。工作组机器的 `USERDOMAIN` 等于机器名，
/// 非 Windows 平台通常没有该变量，两种情况门禁都会关闭。
pub struct EnvIdentity;

impl MachineIdentity for EnvIdentity {
    fn machine_name(&self) -> String {
        std::env::var("COMPUTERNAME")
            .unwrap_or_else(|_| gethostname::gethostname().to_string_lossy().to_string())
    }

    fn account_domain(&self) -> String {
        std::env::var("USERDOMAIN").unwrap_or_default()
    }
}

/// 打印目录查询：返回某台打印服务器上共享队列的规范路径。
pub trait DirectoryQuery: Send {
    fn shared_queues(&self, server: &str) -> Result<Vec<String>, AppError>;
}

/// 一次目录解析的结果。
///
/// `warning` 承载非致命的连接性错误文案，前端据此提示但不中断。
#[derive(Debug, Clone, Serialize)]
pub struct PrinterListing {
    pub printers: Vec<PrinterEntry>,
    pub off_domain: bool,
    pub warning: Option<String>,
}

impl PrinterListing {
    fn of(printers: Vec<PrinterEntry>) -> Self {
        Self {
            printers,
            off_domain: false,
            warning: None,
        }
    }
}

/// 打印机目录：门禁 + 缓存 + 查询的组合。
pub struct PrinterDirectory<I, Q> {
    identity: I,
    query: Q,
    cache: PrinterCache,
    server: String,
}

impl<I: MachineIdentity, Q: DirectoryQuery> PrinterDirectory<I, Q> {
    pub fn new(identity: I, query: Q, cache: PrinterCache, server: impl Into<String>) -> Self {
        Self {
            identity,
            query,
            cache,
            server: server.into(),
        }
    }

    /// 解析当前可用的共享打印机列表。
    ///
    /// 见模块文档的解析顺序；任何失败都只影响本次调用的结果。
    pub fn list(&self) -> PrinterListing {
        if !self.identity.is_domain_joined() {
            log::info!("🖥️ 机器未入域，打印机目录不可用");
            return PrinterListing {
                printers: Vec::new(),
                off_domain: true,
                warning: None,
            };
        }

        if let Some(paths) = self.cache.load_fresh() {
            log::debug!("📦 命中打印机缓存（{} 条），跳过目录查询", paths.len());
            return PrinterListing::of(to_entries(paths));
        }

        match self.query.shared_queues(&self.server) {
            Ok(paths) => {
                log::info!("🖨️ 目录查询返回 {} 台共享打印机", paths.len());
                if let Err(err) = self.cache.store(&paths) {
                    log::warn!("打印机缓存写入失败（忽略）: {}", err);
                }
                PrinterListing::of(to_entries(paths))
            }
            Err(err) => {
                log::warn!("❌ 查询打印服务器 {} 失败: {}", self.server, err);
                PrinterListing {
                    printers: Vec::new(),
                    off_domain: false,
                    warning: Some(format!("无法从 {} 查询打印机: {}", self.server, err)),
                }
            }
        }
    }
}

fn to_entries(paths: Vec<String>) -> Vec<PrinterEntry> {
    paths
        .into_iter()
        .map(PrinterEntry::from_canonical_path)
        .collect()
}
