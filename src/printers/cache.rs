//! 打印机列表的磁盘缓存
//!
//! # 设计思路
//!
//! 目录查询可能跨网络、可能慢，而共享打印机列表一天内几乎不变。
//! 缓存只是提示（hint）：缺失、过期、损坏、为空都静默退化为重新查询，
//! 永远不会因为缓存问题向用户报错。
//!
//! # 实现思路
//!
//! - 缓存内容为规范路径（UNC）的 JSON 字符串数组，显示名不落盘，
//!   载入时重新推导，避免两种形态漂移。
//! - 新鲜度以文件修改时间对比 TTL 判定，不额外维护时间戳字段。
//! - 写入为整文件替换，读者不会观察到写到一半的内容。

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// TTL 约束的打印机缓存文件。
#[derive(Debug, Clone)]
pub struct PrinterCache {
    path: PathBuf,
    ttl: Duration,
}

impl PrinterCache {
    pub fn new(path: PathBuf, ttl: Duration) -> Self {
        Self { path, ttl }
    }

    /// 缓存文件存在且修改时间距今小于 TTL。
    pub fn is_fresh(&self) -> bool {
        let Ok(metadata) = fs::metadata(&self.path) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };

        match modified.elapsed() {
            Ok(age) => age < self.ttl,
            // 修改时间在未来（时钟回拨）按新鲜处理
            Err(_) => true,
        }
    }

    /// 载入新鲜且可解析的缓存内容。
    ///
    /// 过期、缺失、损坏、空列表一律返回 `None`，由调用方回退到目录查询。
    pub fn load_fresh(&self) -> Option<Vec<String>> {
        if !self.is_fresh() {
            return None;
        }

        let content = fs::read_to_string(&self.path).ok()?;
        let paths: Vec<String> = serde_json::from_str(&content).ok()?;
        if paths.is_empty() { None } else { Some(paths) }
    }

    /// 整文件替换缓存内容，修改时间随写入隐式刷新。
    pub fn store(&self, paths: &[String]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string(paths)
            .map_err(|e| AppError::Storage(format!("序列化打印机缓存失败: {}", e)))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
