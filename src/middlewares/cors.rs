use actix_cors::Cors;
use reqwest::Url;

/// 分享链接所在站点的 origin，例如 `https://drawings.example.com`
pub fn allowed_origin(public_base_url: &str) -> Option<String> {
    let url = Url::parse(public_base_url).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// 只允许 public_base_url 同源的跨域请求携带会话 Cookie
pub fn create_cors(public_base_url: &str) -> Cors {
    let cors = match allowed_origin(public_base_url) {
        Some(origin) => Cors::default().allowed_origin(&origin),
        None => {
            log::warn!("Invalid public base url {public_base_url}, cross-origin requests are rejected");
            Cors::default()
        }
    };

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header;
    use actix_web::{App, HttpResponse, test, web};

    #[::core::prelude::v1::test]
    fn test_allowed_origin() {
        assert_eq!(
            allowed_origin("https://draw.example.com/").as_deref(),
            Some("https://draw.example.com")
        );
        assert_eq!(
            allowed_origin("http://localhost:8080/app").as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(allowed_origin("not a url"), None);
    }

    #[actix_web::test]
    async fn test_only_public_origin_gets_credentials() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors("https://draw.example.com"))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ping")
            .insert_header((header::ORIGIN, "https://draw.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let headers = resp.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://draw.example.com"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );

        let req = test::TestRequest::get()
            .uri("/ping")
            .insert_header((header::ORIGIN, "https://evil.example.com"))
            .to_request();
        if let Ok(resp) = test::try_call_service(&app, req).await {
            assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        }
    }
}
