use crate::error::{AppError, AppResult};
use crate::models::SessionUser;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: String, // ISO-8601
    pub exp: i64,
    pub iat: i64,
}

/// 会话令牌（HS256），写入 `session` Cookie
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, session_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_expires_in,
        }
    }

    /// 签发会话令牌，返回令牌与过期时间
    pub fn generate_session_token(&self, user_id: &str) -> AppResult<(String, DateTime<Utc>)> {
        if user_id.is_empty() {
            return Err(AppError::InternalError("Empty session user id".to_string()));
        }
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.session_expires_in);

        let claims = Claims {
            user_id: user_id.to_string(),
            expires_at: expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, expires_at))
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    /// 校验会话：签名错误、过期、缺少 userId 均返回 None
    pub fn verify_session(&self, token: &str) -> Option<SessionUser> {
        let claims = match self.verify_token(token) {
            Ok(claims) => claims,
            Err(_) => {
                log::info!("Failed to verify session");
                return None;
            }
        };

        if claims.user_id.is_empty() {
            return None;
        }

        let expires_at = DateTime::parse_from_rfc3339(&claims.expires_at)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| DateTime::from_timestamp(claims.exp, 0))?;

        Some(SessionUser {
            user_id: claims.user_id,
            expires_at,
        })
    }

    pub fn get_session_expires_in(&self) -> i64 {
        self.session_expires_in
    }
}
