use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 管理员登录请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub password: String,
}

/// 当前会话用户（鉴权中间件注入到请求扩展中）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}
