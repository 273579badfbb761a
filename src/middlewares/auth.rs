use crate::error::AppError;
use crate::models::SessionUser;
use crate::services::{AuthService, SESSION_COOKIE};
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 需要登录的路由（方法 + 路径），其余均为公开
struct ProtectedRoutes {
    routes: Vec<(Method, &'static str)>,
}

impl ProtectedRoutes {
    fn new() -> Self {
        Self {
            // 只有创建抽奖需要管理员会话，查看与列表公开
            routes: vec![(Method::POST, "/api/drawings")],
        }
    }

    fn is_protected(&self, method: &Method, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        self.routes
            .iter()
            .any(|(m, p)| m == method && *p == path)
    }
}

/// 从 `session` Cookie 或 `Authorization: Bearer` 中取会话令牌
pub fn extract_session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

pub struct AuthMiddleware {
    auth_service: AuthService,
}

impl AuthMiddleware {
    pub fn new(auth_service: AuthService) -> Self {
        Self { auth_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            auth_service: self.auth_service.clone(),
            protected_routes: ProtectedRoutes::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    auth_service: AuthService,
    protected_routes: ProtectedRoutes,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        // 有效会话总是注入，公开路由也可以识别管理员
        let token = extract_session_token(req.request());
        let session = self.auth_service.verify_session(token.as_deref());

        if !self.protected_routes.is_protected(req.method(), req.path()) {
            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        match session {
            Some(session) => {
                req.extensions_mut().insert(session);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            None => {
                let error = if token.is_some() {
                    AppError::AuthError("Invalid session".to_string())
                } else {
                    AppError::AuthError("Unauthorized".to_string())
                };
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// 获取当前会话用户（由中间件注入）
pub fn get_session_user(req: &HttpRequest) -> Option<SessionUser> {
    req.extensions().get::<SessionUser>().cloned()
}
