use crate::error::AppError;
use crate::middlewares::get_session_user;
use crate::models::*;
use crate::services::DrawingService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/drawings",
    tag = "drawing",
    request_body = CreateDrawingRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "抽奖完成并保存", body = CreateDrawingResponse),
        (status = 400, description = "参数错误（无玩家、无奖品、奖品多于玩家、次数非正数等）"),
        (status = 401, description = "未登录"),
        (status = 500, description = "保存失败")
    )
)]
/// 进行抽奖:
/// 1. 校验名称、玩家与奖品
/// 2. 每个报名次数掷一次 1-1000，取最高点
/// 3. 按最高点降序排名（平局按输入顺序），前 N 名依次获得奖品
/// 4. 保存记录并返回分享链接
pub async fn create_drawing(
    service: web::Data<DrawingService>,
    req: HttpRequest,
    request: web::Json<CreateDrawingRequest>,
) -> Result<HttpResponse> {
    let Some(user) = get_session_user(&req) else {
        return Ok(AppError::AuthError("Unauthorized".to_string()).error_response());
    };
    log::info!("Drawing requested by {}", user.user_id);

    match service.create_drawing(request.into_inner()).await {
        Ok(created) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": created }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/drawings",
    tag = "drawing",
    params(
        ("id" = String, Query, description = "抽奖 ID")
    ),
    responses(
        (status = 200, description = "抽奖记录", body = Drawing),
        (status = 400, description = "缺少 ID 或格式错误"),
        (status = 404, description = "记录不存在")
    )
)]
/// 按查询参数获取抽奖记录（公开）
pub async fn get_drawing_by_query(
    service: web::Data<DrawingService>,
    query: web::Query<DrawingQuery>,
) -> Result<HttpResponse> {
    let Some(id) = query.into_inner().id.filter(|id| !id.is_empty()) else {
        return Ok(AppError::ValidationError("Drawing ID is required".to_string()).error_response());
    };
    match service.get_drawing(&id).await {
        Ok(drawing) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": drawing }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/drawings/{id}",
    tag = "drawing",
    params(
        ("id" = String, Path, description = "抽奖 ID")
    ),
    responses(
        (status = 200, description = "抽奖记录", body = Drawing),
        (status = 400, description = "ID 格式错误"),
        (status = 404, description = "记录不存在")
    )
)]
/// 分享链接对应的只读结果（公开）
pub async fn get_drawing(
    service: web::Data<DrawingService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.get_drawing(&path.into_inner()).await {
        Ok(drawing) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": drawing }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/drawings/list",
    tag = "drawing",
    responses(
        (status = 200, description = "抽奖列表（按时间倒序）", body = [DrawingSummary])
    )
)]
/// 历史抽奖列表（公开）
pub async fn list_drawings(service: web::Data<DrawingService>) -> Result<HttpResponse> {
    match service.list_drawings().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn drawing_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/drawings")
            .route("", web::post().to(create_drawing))
            .route("", web::get().to(get_drawing_by_query))
            .route("/list", web::get().to(list_drawings))
            .route("/{id}", web::get().to(get_drawing)),
    );
}
