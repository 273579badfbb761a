use super::{DrawingStore, newest_first};
use crate::error::{AppError, AppResult};
use crate::models::{Drawing, DrawingSummary};
use crate::utils::validate_drawing_id;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// 进程内存存储，重启后数据丢失
#[derive(Debug, Default)]
pub struct MemoryDrawingStore {
    drawings: RwLock<HashMap<String, Drawing>>,
}

impl MemoryDrawingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrawingStore for MemoryDrawingStore {
    async fn save(&self, drawing: &Drawing) -> AppResult<String> {
        validate_drawing_id(&drawing.id)?;
        let mut drawings = self.drawings.write().await;
        if drawings.contains_key(&drawing.id) {
            return Err(AppError::StorageError(format!(
                "Drawing {} already exists",
                drawing.id
            )));
        }
        drawings.insert(drawing.id.clone(), drawing.clone());
        Ok(drawing.id.clone())
    }

    async fn load_by_id(&self, id: &str) -> AppResult<Drawing> {
        validate_drawing_id(id)?;
        self.drawings
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Drawing not found".to_string()))
    }

    async fn list_summaries(&self) -> AppResult<Vec<DrawingSummary>> {
        let drawings = self.drawings.read().await;
        let summaries = drawings.values().map(DrawingSummary::from).collect();
        Ok(newest_first(summaries, usize::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Player, Prize};
    use chrono::{TimeZone, Utc};

    fn sample(id: &str, day: u32) -> Drawing {
        Drawing {
            id: id.to_string(),
            name: id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 12, day, 0, 0, 0).unwrap(),
            players: vec![Player {
                name: "A".into(),
                entries: 1,
            }],
            prizes: vec![Prize { name: "P1".into() }],
            winners: vec![],
        }
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryDrawingStore::new();
        store.save(&sample("one", 1)).await.unwrap();
        store.save(&sample("two", 2)).await.unwrap();

        assert_eq!(store.load_by_id("one").await.unwrap(), sample("one", 1));
        assert!(matches!(
            store.load_by_id("three").await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(store.save(&sample("one", 3)).await.is_err());

        let ids: Vec<String> = store
            .list_summaries()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["two".to_string(), "one".to_string()]);
    }
}
