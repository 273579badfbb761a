use crate::engine::{self, RandomSource, RngSource};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDrawingRequest, CreateDrawingResponse, Drawing, DrawingSummary, Player, Prize,
};
use crate::services::events::{DrawingEvent, EventSink};
use crate::storage::DrawingStore;
use crate::utils::{generate_drawing_id, validate_drawing_id};
use chrono::{SubsecRound, Utc};
use std::sync::Arc;

/// 抽奖名称最大长度（字符）
pub const MAX_DRAWING_NAME_LEN: usize = 200;

#[derive(Clone)]
pub struct DrawingService {
    store: Arc<dyn DrawingStore>,
    events: Arc<dyn EventSink>,
    public_base_url: String,
    max_total_entries: i64,
}

impl DrawingService {
    pub fn new(
        store: Arc<dyn DrawingStore>,
        events: Arc<dyn EventSink>,
        public_base_url: &str,
        max_total_entries: i64,
    ) -> Self {
        Self {
            store,
            events,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_total_entries,
        }
    }

    /// 只读分享链接
    pub fn share_url(&self, id: &str) -> String {
        format!("{}/drawing/{}", self.public_base_url, id)
    }

    /// 进行抽奖并保存（使用线程本地随机数）
    pub async fn create_drawing(
        &self,
        request: CreateDrawingRequest,
    ) -> AppResult<CreateDrawingResponse> {
        let drawing = {
            let mut rng = RngSource::thread();
            self.prepare_drawing(request, &mut rng)?
        };
        self.persist(drawing).await
    }

    /// 进行抽奖并保存，随机数由调用方提供
    pub async fn create_drawing_with<R>(
        &self,
        request: CreateDrawingRequest,
        rng: &mut R,
    ) -> AppResult<CreateDrawingResponse>
    where
        R: RandomSource + ?Sized,
    {
        let drawing = self.prepare_drawing(request, rng)?;
        self.persist(drawing).await
    }

    /// 校验请求、运行抽奖引擎并组装记录（不做持久化）
    ///
    /// 所有校验都在掷骰之前完成，校验失败不会消耗随机数。
    pub fn prepare_drawing<R>(&self, request: CreateDrawingRequest, rng: &mut R) -> AppResult<Drawing>
    where
        R: RandomSource + ?Sized,
    {
        let (name, players, prizes) = self.normalize_request(request)?;
        let winners = engine::conduct_drawing(&players, &prizes, rng)?;

        Ok(Drawing {
            id: generate_drawing_id(),
            name,
            timestamp: Utc::now().trunc_subsecs(3),
            players,
            prizes,
            winners,
        })
    }

    fn normalize_request(
        &self,
        request: CreateDrawingRequest,
    ) -> AppResult<(String, Vec<Player>, Vec<Prize>)> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Please enter a name for the drawing".into(),
            ));
        }
        if name.chars().count() > MAX_DRAWING_NAME_LEN {
            return Err(AppError::ValidationError(format!(
                "Drawing name must be at most {MAX_DRAWING_NAME_LEN} characters"
            )));
        }

        let players: Vec<Player> = request
            .players
            .into_iter()
            .map(|p| Player {
                name: p.name.trim().to_string(),
                entries: p.entries,
            })
            .collect();
        if players.iter().any(|p| p.name.is_empty()) {
            return Err(AppError::ValidationError("Player name is required".into()));
        }

        let prizes: Vec<Prize> = request
            .prizes
            .into_iter()
            .map(|p| Prize {
                name: p.name.trim().to_string(),
            })
            .collect();
        if prizes.iter().any(|p| p.name.is_empty()) {
            return Err(AppError::ValidationError("Prize name is required".into()));
        }

        engine::validate_inputs(&players, &prizes)?;

        let total_entries = players
            .iter()
            .try_fold(0i64, |acc, p| acc.checked_add(p.entries));
        match total_entries {
            Some(total) if total <= self.max_total_entries => {}
            _ => {
                return Err(AppError::ValidationError(format!(
                    "Total entries must not exceed {}",
                    self.max_total_entries
                )));
            }
        }

        Ok((name, players, prizes))
    }

    /// 单次保存，失败不重试
    async fn persist(&self, drawing: Drawing) -> AppResult<CreateDrawingResponse> {
        let id = match self.store.save(&drawing).await {
            Ok(id) => id,
            Err(e) => {
                // 结果已算出，记录下来便于人工补录
                log::warn!(
                    "Failed to save drawing {} ({}): winners = {}",
                    drawing.id,
                    drawing.name,
                    serde_json::to_string(&drawing.winners).unwrap_or_default()
                );
                return Err(e);
            }
        };

        log::info!(
            "Drawing {} conducted: {} players, {} prizes",
            id,
            drawing.players.len(),
            drawing.prizes.len()
        );
        self.events.emit(DrawingEvent::Conducted {
            drawing_id: id.clone(),
            drawing_name: drawing.name.clone(),
            player_count: drawing.players.len(),
            prize_count: drawing.prizes.len(),
            total_entries: drawing.total_entries(),
        });

        Ok(CreateDrawingResponse {
            url: self.share_url(&id),
            id,
            drawing,
        })
    }

    /// 按 id 读取（公开）
    pub async fn get_drawing(&self, id: &str) -> AppResult<Drawing> {
        validate_drawing_id(id)?;
        let drawing = self.store.load_by_id(id).await?;
        self.events.emit(DrawingEvent::Viewed {
            drawing_id: drawing.id.clone(),
            drawing_name: drawing.name.clone(),
            player_count: drawing.players.len(),
            prize_count: drawing.prizes.len(),
        });
        Ok(drawing)
    }

    /// 抽奖列表（公开，按时间倒序）
    pub async fn list_drawings(&self) -> AppResult<Vec<DrawingSummary>> {
        self.store.list_summaries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{NO_PRIZE, ScriptedRolls};
    use crate::storage::MemoryDrawingStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<DrawingEvent>>,
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: DrawingEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct FailingStore;

    #[async_trait]
    impl DrawingStore for FailingStore {
        async fn save(&self, _drawing: &Drawing) -> AppResult<String> {
            Err(AppError::StorageError("backend down".into()))
        }
        async fn load_by_id(&self, _id: &str) -> AppResult<Drawing> {
            Err(AppError::StorageError("backend down".into()))
        }
        async fn list_summaries(&self) -> AppResult<Vec<DrawingSummary>> {
            Err(AppError::StorageError("backend down".into()))
        }
    }

    fn service_with(store: Arc<dyn DrawingStore>, sink: Arc<RecordingSink>) -> DrawingService {
        DrawingService::new(store, sink, "https://draw.example.com/", 100)
    }

    fn request(name: &str, players: &[(&str, i64)], prizes: &[&str]) -> CreateDrawingRequest {
        CreateDrawingRequest {
            name: name.to_string(),
            players: players
                .iter()
                .map(|(n, e)| Player {
                    name: n.to_string(),
                    entries: *e,
                })
                .collect(),
            prizes: prizes
                .iter()
                .map(|n| Prize {
                    name: n.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_drawing() {
        let sink = Arc::new(RecordingSink::default());
        let service = service_with(Arc::new(MemoryDrawingStore::new()), sink.clone());
        let mut rng = ScriptedRolls::new(vec![500, 700]);

        let created = service
            .create_drawing_with(
                request("  December  ", &[("Alice", 1), ("Bob", 1)], &["Gold"]),
                &mut rng,
            )
            .await
            .unwrap();

        assert_eq!(created.drawing.name, "December");
        assert_eq!(
            created.url,
            format!("https://draw.example.com/drawing/{}", created.id)
        );
        assert_eq!(created.drawing.winners[0].player, "Bob");
        assert_eq!(created.drawing.winners[0].prize, "Gold");
        assert_eq!(created.drawing.winners[1].prize, NO_PRIZE);

        let loaded = service.get_drawing(&created.id).await.unwrap();
        assert_eq!(loaded, created.drawing);

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            DrawingEvent::Conducted { total_entries: 2, player_count: 2, prize_count: 1, .. }
        ));
        assert!(matches!(&events[1], DrawingEvent::Viewed { .. }));
    }

    #[tokio::test]
    async fn test_validation_consumes_no_randomness() {
        let sink = Arc::new(RecordingSink::default());
        let store = Arc::new(MemoryDrawingStore::new());
        let service = service_with(store.clone(), sink.clone());

        let cases = vec![
            request("   ", &[("A", 1)], &["P1"]),
            request("X", &[("   ", 1)], &["P1"]),
            request("X", &[("A", 1)], &[""]),
            request("X", &[], &["P1"]),
            request("X", &[("A", 1)], &[]),
            request("X", &[("A", 3)], &["P1", "P2"]),
            request("X", &[("A", 0)], &["P1"]),
            request("X", &[("A", 60), ("B", 41)], &["P1"]),
            request("X", &[("A", i64::MAX), ("B", 1)], &["P1"]),
            request(&"n".repeat(MAX_DRAWING_NAME_LEN + 1), &[("A", 1)], &["P1"]),
        ];

        for case in cases {
            let mut rng = ScriptedRolls::new(vec![1]);
            let err = service.create_drawing_with(case, &mut rng).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)), "{err:?}");
            assert_eq!(rng.consumed(), 0);
        }

        assert!(store.list_summaries().await.unwrap().is_empty());
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let sink = Arc::new(RecordingSink::default());
        let service = service_with(Arc::new(FailingStore), sink.clone());

        let err = service
            .create_drawing(request("X", &[("A", 1)], &["P1"]))
            .await
            .unwrap_err();
        assert!(err.is_storage_failure());
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_and_malformed() {
        let sink = Arc::new(RecordingSink::default());
        let service = service_with(Arc::new(MemoryDrawingStore::new()), sink);

        assert!(matches!(
            service.get_drawing("missing").await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.get_drawing("a b").await.unwrap_err(),
            AppError::ValidationError(_)
        ));
    }
}
