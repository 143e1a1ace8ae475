//! Local development server. Wraps each HTTP request in a gateway envelope
//! and runs it through the same handlers the Lambda functions use.

use crate::{
    bootstrap::Bootstrap,
    handlers::{GatewayHandler, GeneralHandler, VariationHandler, VisionHandler},
    models::{GatewayEvent, GatewayResponse},
};
use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};

pub struct Functions {
    general: GeneralHandler,
    variation: VariationHandler,
    vision: VisionHandler,
}

impl Functions {
    pub fn new(general: GeneralHandler, variation: VariationHandler, vision: VisionHandler) -> Self {
        Self {
            general,
            variation,
            vision,
        }
    }

    fn get(&self, name: &str) -> Option<&dyn GatewayHandler> {
        match name {
            "general" => Some(&self.general),
            "variation" => Some(&self.variation),
            "vision" => Some(&self.vision),
            _ => None,
        }
    }
}

fn to_http(response: GatewayResponse) -> HttpResponse {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HttpResponse::build(status);
    builder.content_type("application/json");
    for (name, value) in &response.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }
    builder.body(response.body)
}

async fn invoke(
    functions: web::Data<Functions>,
    name: web::Path<String>,
    req: HttpRequest,
    body: String,
) -> HttpResponse {
    let Some(handler) = functions.get(&name) else {
        return HttpResponse::NotFound().finish();
    };

    let body = if body.is_empty() { None } else { Some(body) };
    let event = GatewayEvent::new(req.method().as_str(), body);
    log::info!("{} {}", req.method(), req.path());

    to_http(handler.handle_event(event).await)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/{function}", web::route().to(invoke));
}

pub async fn run(bootstrap: Bootstrap, port: u16) -> std::io::Result<()> {
    let platform = bootstrap
        .platform()
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let functions = web::Data::new(Functions::new(
        GeneralHandler::from_platform(&platform),
        VariationHandler::from_platform(&platform),
        VisionHandler::from_platform(&platform),
    ));

    log::info!("🌐 Dev server listening on http://127.0.0.1:{}", port);
    HttpServer::new(move || App::new().app_data(functions.clone()).configure(configure))
        .bind(("127.0.0.1", port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use actix_web::test;
    use serde_json::json;
    use std::sync::Arc;

    fn functions() -> web::Data<Functions> {
        web::Data::new(Functions::new(
            GeneralHandler::new(
                Arc::new(FakeText::replying("unused")),
                Arc::new(FakeImages::default()),
                Arc::new(FakeCaptioner::replying("unused")),
                Arc::new(FakeFetcher::default()),
            ),
            VariationHandler::new(Arc::new(FakeImages::default())),
            VisionHandler::new(
                Arc::new(FakeVision::replying("A calm seascape.")),
                Arc::new(FakeFetcher::default()),
            ),
        ))
    }

    #[actix_web::test]
    async fn test_post_is_routed_to_function() {
        let app = test::init_service(App::new().app_data(functions()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/vision")
            .set_payload(
                json!({"action": "image description", "selectedImageUrl": "https://x/y.png"})
                    .to_string(),
            )
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"image": "A calm seascape."}));
    }

    #[actix_web::test]
    async fn test_options_is_preflight() {
        let app = test::init_service(App::new().app_data(functions()).configure(configure)).await;
        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/general")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"message": "CORS preflight response"}));
    }

    #[actix_web::test]
    async fn test_unknown_function_is_404() {
        let app = test::init_service(App::new().app_data(functions()).configure(configure)).await;
        let req = test::TestRequest::post().uri("/embeddings").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
