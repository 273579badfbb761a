pub mod auth;
pub mod drawing;

pub use auth::auth_config;
pub use drawing::drawing_config;

use crate::error::AppError;
use actix_web::web;

/// `/api` 下的全部路由，请求体解析失败按校验错误返回
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .configure(auth_config)
            .configure(drawing_config),
    );
}
