use crate::error::{AppError, AppResult};
use bcrypt::verify;

/// 配置中的管理员密码是否为 bcrypt 哈希
pub fn is_bcrypt_hash(value: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| value.starts_with(prefix))
}

/// 校验管理员密码，配置为空时总是失败
pub fn verify_admin_password(candidate: &str, configured: &str) -> AppResult<bool> {
    if configured.is_empty() || candidate.is_empty() {
        return Ok(false);
    }
    if is_bcrypt_hash(configured) {
        return verify(candidate, configured)
            .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")));
    }
    Ok(constant_time_eq(candidate.as_bytes(), configured.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
