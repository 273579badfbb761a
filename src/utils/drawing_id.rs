use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

// 兼容旧数据的纯数字时间戳 id 与 UUID
static DRAWING_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{1,64}$").expect("valid drawing id pattern"));

/// 生成新的抽奖 id
pub fn generate_drawing_id() -> String {
    Uuid::new_v4().to_string()
}

/// 校验抽奖 id 格式，避免非法字符进入存储路径
pub fn validate_drawing_id(id: &str) -> AppResult<()> {
    if !DRAWING_ID_REGEX.is_match(id) {
        return Err(AppError::ValidationError(
            "Invalid drawing ID format".to_string(),
        ));
    }
    Ok(())
}
