//! 抽奖记录持久化
//!
//! 统一的 [`DrawingStore`] 接口，三种实现按配置 `storage.backend` 选择：
//! - `filesystem`：本地目录 `{data_dir}/drawings/{id}.json`
//! - `blob`：HTTP 对象存储（兼容 Vercel Blob API）
//! - `memory`：进程内存，开发与测试使用
//!
//! 记录只追加不修改：同一个 id 不允许重复写入。

pub mod blob;
pub mod filesystem;
pub mod memory;

pub use blob::BlobDrawingStore;
pub use filesystem::FilesystemDrawingStore;
pub use memory::MemoryDrawingStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::AppResult;
use crate::models::{Drawing, DrawingSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// 列表中缺少名称的记录显示为该名称
pub const UNNAMED_DRAWING: &str = "Unnamed Drawing";

#[async_trait]
pub trait DrawingStore: Send + Sync {
    /// 保存记录，返回 id
    async fn save(&self, drawing: &Drawing) -> AppResult<String>;

    /// 按 id 读取，不存在时返回 `AppError::NotFound`
    async fn load_by_id(&self, id: &str) -> AppResult<Drawing>;

    /// 所有记录摘要，按时间倒序
    async fn list_summaries(&self) -> AppResult<Vec<DrawingSummary>>;
}

pub fn create_store(config: &StorageConfig) -> AppResult<Arc<dyn DrawingStore>> {
    let store: Arc<dyn DrawingStore> = match config.backend {
        StorageBackend::Filesystem => Arc::new(FilesystemDrawingStore::new(
            &config.data_dir,
            config.list_limit,
        )),
        StorageBackend::Blob => Arc::new(BlobDrawingStore::new(
            config.blob.clone(),
            config.list_limit,
        )?),
        StorageBackend::Memory => Arc::new(MemoryDrawingStore::new()),
    };
    log::info!("Using {:?} drawing storage", config.backend);
    Ok(store)
}

/// 列表只需要头部字段，宽松解析以兼容缺字段的旧数据
#[derive(Debug, Deserialize)]
struct DrawingHeader {
    id: Option<String>,
    name: Option<String>,
    timestamp: Option<String>,
    players: Option<Vec<serde_json::Value>>,
    prizes: Option<Vec<serde_json::Value>>,
}

/// 从原始 JSON 生成摘要；无法解析或缺少 id / timestamp 时返回 None 并记录日志
pub(crate) fn summarize_raw(source: &str, raw: &[u8]) -> Option<DrawingSummary> {
    let header: DrawingHeader = match serde_json::from_slice(raw) {
        Ok(h) => h,
        Err(e) => {
            log::error!("Error parsing drawing {source}: {e}");
            return None;
        }
    };

    let id = header.id.filter(|id| !id.is_empty());
    let timestamp = header
        .timestamp
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc));

    let (Some(id), Some(timestamp)) = (id, timestamp) else {
        log::error!("Invalid drawing data in {source}");
        return None;
    };

    Some(DrawingSummary {
        id,
        name: header
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNNAMED_DRAWING.to_string()),
        timestamp,
        player_count: header.players.map(|p| p.len()).unwrap_or(0),
        prize_count: header.prizes.map(|p| p.len()).unwrap_or(0),
    })
}

/// 按时间倒序并截断
pub(crate) fn newest_first(mut summaries: Vec<DrawingSummary>, limit: usize) -> Vec<DrawingSummary> {
    summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    summaries.truncate(limit);
    summaries
}
