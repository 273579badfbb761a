use super::{DrawingStore, newest_first, summarize_raw};
use crate::config::BlobConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Drawing, DrawingSummary};
use crate::utils::validate_drawing_id;
use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const BLOB_API_VERSION: &str = "7";
const LIST_PAGE_SIZE: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct PutBlobResponse {
    pub url: String,
    pub pathname: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobEntry {
    pub url: String,
    pub pathname: String,
}

#[derive(Debug, Deserialize)]
pub struct ListBlobResponse {
    #[serde(default)]
    pub blobs: Vec<BlobEntry>,
    pub cursor: Option<String>,
    #[serde(rename = "hasMore", default)]
    pub has_more: bool,
}

/// HTTP 对象存储（兼容 Vercel Blob API）
///
/// 写入：`PUT {base_url}/{prefix}{id}.json`
/// 列表：`GET {base_url}?prefix=...&limit=...&cursor=...`
/// 读取：直接请求列表返回的 blob url
#[derive(Clone)]
pub struct BlobDrawingStore {
    http: Client,
    cfg: BlobConfig,
    list_limit: usize,
}

impl BlobDrawingStore {
    pub fn new(cfg: BlobConfig, list_limit: usize) -> AppResult<Self> {
        if cfg.token.is_empty() {
            log::warn!("Blob storage token is empty, requests will likely be rejected");
        }
        let http = Client::builder()
            .user_agent("drawings-backend/blob")
            .build()?;
        Ok(Self {
            http,
            cfg,
            list_limit,
        })
    }

    fn base_url(&self) -> &str {
        self.cfg.base_url.trim_end_matches('/')
    }

    pub fn pathname(&self, id: &str) -> String {
        format!("{}{}.json", self.cfg.prefix, id)
    }

    pub fn put_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url(), self.pathname(id))
    }

    async fn list_page(
        &self,
        prefix: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> AppResult<ListBlobResponse> {
        let limit = limit.to_string();
        let mut query = vec![("prefix", prefix), ("limit", limit.as_str())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let resp = self
            .http
            .get(self.base_url())
            .bearer_auth(&self.cfg.token)
            .header("x-api-version", BLOB_API_VERSION)
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!(
                "Blob list failed: HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }
        Ok(resp.json().await?)
    }

    /// 读取 blob 内容，404 返回 None
    async fn fetch(&self, url: &str) -> AppResult<Option<Vec<u8>>> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::StorageError(format!(
                "Failed to fetch blob content: HTTP {}",
                status.as_u16()
            )));
        }
        Ok(Some(resp.bytes().await?.to_vec()))
    }

    async fn find_blob(&self, id: &str) -> AppResult<Option<BlobEntry>> {
        let pathname = self.pathname(id);
        let page = self.list_page(&pathname, None, 10).await?;
        Ok(page.blobs.into_iter().find(|b| b.pathname == pathname))
    }
}

#[async_trait]
impl DrawingStore for BlobDrawingStore {
    async fn save(&self, drawing: &Drawing) -> AppResult<String> {
        validate_drawing_id(&drawing.id)?;
        let body = serde_json::to_string_pretty(drawing)?;

        let resp = self
            .http
            .put(self.put_url(&drawing.id))
            .bearer_auth(&self.cfg.token)
            .header("x-api-version", BLOB_API_VERSION)
            .header("x-content-type", "application/json")
            .header("x-add-random-suffix", "0")
            .header("x-allow-overwrite", "0")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!(
                "Blob put failed: HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let put: PutBlobResponse = resp.json().await?;
        log::info!("Saved drawing {} to blob {} ({})", drawing.id, put.pathname, put.url);
        Ok(drawing.id.clone())
    }

    async fn load_by_id(&self, id: &str) -> AppResult<Drawing> {
        validate_drawing_id(id)?;
        let blob = self
            .find_blob(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Drawing not found".to_string()))?;

        let raw = self
            .fetch(&blob.url)
            .await?
            .ok_or_else(|| AppError::NotFound("Drawing not found".to_string()))?;

        serde_json::from_slice(&raw)
            .map_err(|e| AppError::StorageError(format!("Corrupt drawing {id}: {e}")))
    }

    async fn list_summaries(&self) -> AppResult<Vec<DrawingSummary>> {
        let mut blobs: Vec<BlobEntry> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let remaining = self.list_limit.saturating_sub(blobs.len());
            if remaining == 0 {
                break;
            }
            let page = self
                .list_page(
                    &self.cfg.prefix,
                    cursor.as_deref(),
                    remaining.min(LIST_PAGE_SIZE),
                )
                .await?;
            blobs.extend(page.blobs);
            if !page.has_more || page.cursor.is_none() {
                break;
            }
            cursor = page.cursor;
        }

        let fetched = join_all(blobs.iter().map(|blob| async move {
            match self.fetch(&blob.url).await {
                Ok(Some(raw)) => summarize_raw(&blob.pathname, &raw),
                Ok(None) => {
                    log::error!("Failed to fetch blob {}", blob.pathname);
                    None
                }
                Err(e) => {
                    log::error!("Failed to fetch blob {}: {e}", blob.pathname);
                    None
                }
            }
        }))
        .await;

        let summaries = fetched.into_iter().flatten().collect();
        Ok(newest_first(summaries, self.list_limit))
    }
}
