//! 打印机目录解析链的集成测试
//!
//! 身份与目录查询均为脚本化替身，缓存落在临时目录，
//! 不触碰真实的 ProgramData、网络或打印后台程序。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use helpcard::error::AppError;
use helpcard::printers::cache::PrinterCache;
use helpcard::printers::directory::{DirectoryQuery, MachineIdentity, PrinterDirectory};

struct FixedIdentity {
    machine: &'static str,
    domain: &'static str,
}

impl MachineIdentity for FixedIdentity {
    fn machine_name(&self) -> String {
        self.machine.to_string()
    }

    fn account_domain(&self) -> String {
        self.domain.to_string()
    }
}

fn domain_joined() -> FixedIdentity {
    FixedIdentity {
        machine: "WS-042",
        domain: "CORP",
    }
}

fn workgroup() -> FixedIdentity {
    FixedIdentity {
        machine: "WS-042",
        domain: "ws-042",
    }
}

/// 记录调用次数的目录查询替身。`response: None` 表示服务器不可达。
struct ScriptedQuery {
    response: Option<Vec<String>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedQuery {
    fn reachable(paths: &[&str]) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                response: Some(paths.iter().map(|p| p.to_string()).collect()),
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn unreachable() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                response: None,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl DirectoryQuery for ScriptedQuery {
    fn shared_queues(&self, server: &str) -> Result<Vec<String>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(paths) => Ok(paths.clone()),
            None => Err(AppError::Printer(format!("服务器 {} 不可达", server))),
        }
    }
}

fn day_long_cache(dir: &tempfile::TempDir) -> PrinterCache {
    PrinterCache::new(
        dir.path().join("printers.json"),
        Duration::from_secs(24 * 3600),
    )
}

#[test]
fn fresh_cache_serves_entries_without_any_server_call() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = day_long_cache(&dir);
    cache
        .store(&["\\\\S\\A".to_string(), "\\\\S\\B".to_string()])
        .expect("seed cache");

    let (query, calls) = ScriptedQuery::unreachable();
    let directory = PrinterDirectory::new(domain_joined(), query, cache, "\\\\S");

    let listing = directory.list();

    assert!(!listing.off_domain);
    assert!(listing.warning.is_none());
    let names: Vec<&str> = listing
        .printers
        .iter()
        .map(|p| p.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(calls.load(Ordering::SeqCst), 0, "cache hit must skip server");
}

#[test]
fn missing_cache_queries_server_and_rewrites_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = day_long_cache(&dir);

    let (query, calls) = ScriptedQuery::reachable(&["\\\\S\\C"]);
    let directory = PrinterDirectory::new(domain_joined(), query, cache, "\\\\S");

    let listing = directory.list();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(listing.printers.len(), 1);
    assert_eq!(listing.printers[0].display_name, "C");
    assert_eq!(listing.printers[0].canonical_path, "\\\\S\\C");

    let persisted = std::fs::read_to_string(dir.path().join("printers.json")).expect("cache file");
    let parsed: Vec<String> = serde_json::from_str(&persisted).expect("cache json");
    assert_eq!(parsed, vec!["\\\\S\\C".to_string()]);
}

#[test]
fn expired_cache_falls_through_to_server() {
    let dir = tempfile::tempdir().expect("tempdir");
    let stale = PrinterCache::new(dir.path().join("printers.json"), Duration::ZERO);
    stale.store(&["\\\\S\\Old".to_string()]).expect("seed");

    let (query, calls) = ScriptedQuery::reachable(&["\\\\S\\New"]);
    let directory = PrinterDirectory::new(domain_joined(), query, stale, "\\\\S");

    let listing = directory.list();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(listing.printers[0].display_name, "New");
}

#[test]
fn corrupt_cache_is_silently_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("printers.json"), "garbage{{").expect("write");

    let (query, calls) = ScriptedQuery::reachable(&["\\\\S\\C"]);
    let directory = PrinterDirectory::new(domain_joined(), query, day_long_cache(&dir), "\\\\S");

    let listing = directory.list();

    assert!(listing.warning.is_none(), "corruption is never user-visible");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(listing.printers[0].display_name, "C");
}

#[test]
fn off_domain_returns_empty_without_file_or_network_access() {
    let dir = tempfile::tempdir().expect("tempdir");
    // 缓存路径指向尚不存在的子目录：门禁关闭时连目录都不该出现
    let cache_path = dir.path().join("PRH").join("printers.json");
    let cache = PrinterCache::new(cache_path.clone(), Duration::from_secs(24 * 3600));
    let (query, calls) = ScriptedQuery::reachable(&["\\\\S\\C"]);
    let directory = PrinterDirectory::new(workgroup(), query, cache, "\\\\S");

    let listing = directory.list();

    assert!(listing.off_domain);
    assert!(listing.printers.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!cache_path.exists(), "gate must run before any cache I/O");
    assert!(
        !dir.path().join("PRH").exists(),
        "off-domain listing must not create the cache directory either"
    );
}

#[test]
fn unreachable_server_degrades_to_empty_with_warning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (query, calls) = ScriptedQuery::unreachable();
    let directory = PrinterDirectory::new(domain_joined(), query, day_long_cache(&dir), "\\\\S");

    let listing = directory.list();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!listing.off_domain);
    assert!(listing.printers.is_empty());
    let warning = listing.warning.expect("connectivity failure must warn");
    assert!(warning.contains("\\\\S"));
    assert!(
        !dir.path().join("printers.json").exists(),
        "failed query must not touch the cache"
    );
}

#[test]
fn domain_gate_is_case_insensitive() {
    assert!(
        !FixedIdentity {
            machine: "WS-042",
            domain: "WS-042",
        }
        .is_domain_joined()
    );
    assert!(
        !FixedIdentity {
            machine: "ws-042",
            domain: "WS-042",
        }
        .is_domain_joined()
    );
    assert!(
        FixedIdentity {
            machine: "WS-042",
            domain: "CORP",
        }
        .is_domain_joined()
    );
    assert!(
        !FixedIdentity {
            machine: "WS-042",
            domain: "",
        }
        .is_domain_joined()
    );
}
