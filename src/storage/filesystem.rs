use super::{DrawingStore, newest_first, summarize_raw};
use crate::error::{AppError, AppResult};
use crate::models::{Drawing, DrawingSummary};
use crate::utils::validate_drawing_id;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 本地文件存储：每条记录一个 JSON 文件
#[derive(Debug, Clone)]
pub struct FilesystemDrawingStore {
    dir: PathBuf,
    list_limit: usize,
}

impl FilesystemDrawingStore {
    pub fn new(data_dir: impl AsRef<Path>, list_limit: usize) -> Self {
        Self {
            dir: data_dir.as_ref().join("drawings"),
            list_limit,
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl DrawingStore for FilesystemDrawingStore {
    async fn save(&self, drawing: &Drawing) -> AppResult<String> {
        validate_drawing_id(&drawing.id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(&drawing.id);

        // 先写唯一命名的临时文件，再用 hard_link 发布；目标已存在时 link 失败，不会覆盖
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", drawing.id, uuid::Uuid::new_v4()));
        let body = serde_json::to_vec_pretty(drawing)?;
        tokio::fs::write(&tmp, body).await?;
        let published = tokio::fs::hard_link(&tmp, &path).await;
        if let Err(e) = tokio::fs::remove_file(&tmp).await {
            log::warn!("Failed to remove temp file {}: {e}", tmp.display());
        }
        match published {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::StorageError(format!(
                    "Drawing {} already exists",
                    drawing.id
                )));
            }
            Err(e) => return Err(e.into()),
        }

        log::info!("Saved drawing {} to {}", drawing.id, path.display());
        Ok(drawing.id.clone())
    }

    async fn load_by_id(&self, id: &str) -> AppResult<Drawing> {
        validate_drawing_id(id)?;
        let raw = match tokio::fs::read(self.path_for(id)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound("Drawing not found".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&raw)
            .map_err(|e| AppError::StorageError(format!("Corrupt drawing {id}: {e}")))
    }

    async fn list_summaries(&self) -> AppResult<Vec<DrawingSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path.extension().is_some_and(|ext| ext == "json")
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_record {
                continue;
            }

            match tokio::fs::read(&path).await {
                Ok(raw) => {
                    if let Some(summary) = summarize_raw(&path.display().to_string(), &raw) {
                        summaries.push(summary);
                    }
                }
                Err(e) => log::error!("Failed to read {}: {e}", path.display()),
            }
        }

        Ok(newest_first(summaries, self.list_limit))
    }
}
