use crate::error::AppError;
use crate::middlewares::get_session_user;
use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功，写入 session Cookie", body = SessionUser),
        (status = 401, description = "密码错误")
    )
)]
/// 管理员登录
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(&request) {
        Ok((token, session)) => Ok(HttpResponse::Ok()
            .cookie(auth_service.session_cookie(token))
            .json(json!({
                "success": true,
                "data": session
            }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "已退出，清除 session Cookie")
    )
)]
/// 退出登录
pub async fn logout(auth_service: web::Data<AuthService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .cookie(auth_service.removal_cookie())
        .json(json!({
            "success": true,
            "message": "Logged out"
        })))
}

#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "auth",
    responses(
        (status = 200, description = "当前会话", body = SessionUser),
        (status = 401, description = "未登录")
    )
)]
/// 查询当前会话
pub async fn session(req: HttpRequest) -> Result<HttpResponse> {
    match get_session_user(&req) {
        Some(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        None => Ok(AppError::AuthError("Unauthorized".to_string()).error_response()),
    }
}

/// 路由配置
pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/session", web::get().to(session)),
    );
}
