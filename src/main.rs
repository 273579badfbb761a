use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use drawings_backend::{
    config::Config,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::{AuthService, DrawingService, LogEventSink},
    storage::create_store,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().map_err(|e| std::io::Error::other(e.to_string()))?;

    // 存储后端
    let store = create_store(&config.storage).map_err(|e| std::io::Error::other(e.to_string()))?;

    // 会话与服务
    let jwt_service = JwtService::new(&config.auth.session_secret, config.auth.session_expires_in);
    let auth_service = AuthService::new(
        jwt_service,
        &config.auth.admin_password,
        config.server.production,
    );
    let drawing_service = DrawingService::new(
        store,
        Arc::new(LogEventSink),
        &config.server.public_base_url,
        config.drawing.max_total_entries,
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let public_base_url = config.server.public_base_url.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(auth_service.clone()))
            .wrap(create_cors(&public_base_url))
            .wrap(Logger::default())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(drawing_service.clone()))
            .configure(swagger_config)
            .configure(handlers::api_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
