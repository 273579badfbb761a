use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, SessionUser};
use crate::utils::{JwtService, verify_admin_password};
use actix_web::cookie::{Cookie, SameSite, time::Duration};

/// 管理员账号（系统只有一个操作者）
pub const ADMIN_USER_ID: &str = "admin";
/// 会话 Cookie 名称
pub const SESSION_COOKIE: &str = "session";

#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    admin_password: String,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(jwt_service: JwtService, admin_password: &str, secure_cookies: bool) -> Self {
        if admin_password.is_empty() {
            log::warn!("Admin password is not configured, login is disabled");
        }
        Self {
            jwt_service,
            admin_password: admin_password.to_string(),
            secure_cookies,
        }
    }

    /// 管理员登录，成功返回会话令牌
    pub fn login(&self, request: &LoginRequest) -> AppResult<(String, SessionUser)> {
        if !verify_admin_password(&request.password, &self.admin_password)? {
            return Err(AppError::AuthError("Invalid password".to_string()));
        }

        let (token, expires_at) = self.jwt_service.generate_session_token(ADMIN_USER_ID)?;
        log::info!("Admin session created");
        Ok((
            token,
            SessionUser {
                user_id: ADMIN_USER_ID.to_string(),
                expires_at,
            },
        ))
    }

    /// 校验会话令牌，无效返回 None
    pub fn verify_session(&self, token: Option<&str>) -> Option<SessionUser> {
        token
            .filter(|t| !t.is_empty())
            .and_then(|t| self.jwt_service.verify_session(t))
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// HttpOnly / SameSite=Lax，生产环境带 Secure
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(Duration::seconds(self.jwt_service.get_session_expires_in()))
            .finish()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .finish();
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(password: &str) -> AuthService {
        AuthService::new(JwtService::new("test-secret", 3600), password, true)
    }

    #[test]
    fn test_login_success() {
        let auth = service("hunter2");
        let (token, user) = auth
            .login(&LoginRequest {
                password: "hunter2".into(),
            })
            .unwrap();
        assert_eq!(user.user_id, ADMIN_USER_ID);

        let session = auth.verify_session(Some(&token)).unwrap();
        assert_eq!(session.user_id, ADMIN_USER_ID);
    }

    #[test]
    fn test_login_wrong_password() {
        let auth = service("hunter2");
        let err = auth
            .login(&LoginRequest {
                password: "nope".into(),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(ref m) if m == "Invalid password"));
    }

    #[test]
    fn test_login_disabled_without_password() {
        let auth = service("");
        assert!(auth
            .login(&LoginRequest {
                password: String::new()
            })
            .is_err());
    }

    #[test]
    fn test_verify_missing_token() {
        let auth = service("hunter2");
        assert!(auth.verify_session(None).is_none());
        assert!(auth.verify_session(Some("")).is_none());
        assert!(auth.verify_session(Some("garbage")).is_none());
    }

    #[test]
    fn test_token_from_jwt_service_is_accepted() {
        let auth = service("hunter2");
        let (token, expires_at) = auth
            .jwt_service()
            .generate_session_token(ADMIN_USER_ID)
            .unwrap();

        let session = auth.verify_session(Some(&token)).unwrap();
        assert_eq!(session.user_id, ADMIN_USER_ID);
        assert_eq!(
            session.expires_at.timestamp_millis(),
            expires_at.timestamp_millis()
        );
        assert_eq!(auth.jwt_service().get_session_expires_in(), 3600);
    }

    #[test]
    fn test_session_cookie_flags() {
        let auth = service("hunter2");
        let cookie = auth.session_cookie("token".into());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(3600)));

        let removal = auth.removal_cookie();
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(Duration::ZERO));
    }
}
