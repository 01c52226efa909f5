//! Request-level error-path tests that need no backend at all: these
//! failures must fire before any network call is attempted.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use llm_gateway::config::{Config, VertexConfig};
use llm_gateway::server::{routes, AppState};
use serde_json::{json, Value};

macro_rules! query_app {
    ($config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($config)))
                .configure(routes::gateway::configure_routes),
        )
        .await
    };
}

#[tokio::test]
async fn unsupported_models_are_rejected_with_400() {
    // No credentials configured anywhere: if the handler tried to open a
    // backend handle first, this would be a 500 instead.
    let app = query_app!(Config::default());

    let req = test::TestRequest::post()
        .uri("/v1/query")
        .set_json(json!({"models": ["unknown-model"], "prompt": "q"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "MODEL_SELECTION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("unknown-model"));
}

#[tokio::test]
async fn single_model_string_selection_is_accepted() {
    let app = query_app!(Config::default());

    // "models" as a bare string resolves like a one-element list; with no
    // credentials configured the backend handle fails, proving resolution
    // got past selection.
    let req = test::TestRequest::post()
        .uri("/v1/query")
        .set_json(json!({"models": "gpt-4", "prompt": "q"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "CLIENT_INIT_ERROR");
}

#[tokio::test]
async fn blank_prompt_is_rejected_with_400() {
    let app = query_app!(Config::default());

    let req = test::TestRequest::post()
        .uri("/v1/query")
        .set_json(json!({"prompt": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_openai_key_is_a_config_error_not_candidate_exhaustion() {
    // Vertex is fully configured; only the OpenAI key is absent. The
    // request must fail as a configuration error before any fan-out, not
    // dribble through generation and come back as NO_VIABLE_CANDIDATE.
    let config = Config {
        vertex: VertexConfig {
            project_id: Some("test-project".to_string()),
            ..VertexConfig::default()
        },
        ..Config::default()
    };
    let app = query_app!(config);

    let req = test::TestRequest::post()
        .uri("/v1/query")
        .set_json(json!({"models": ["gpt-4"], "prompt": "q"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "CLIENT_INIT_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn missing_vertex_project_is_a_server_error() {
    let config = Config {
        vertex: VertexConfig {
            project_id: None,
            ..VertexConfig::default()
        },
        ..Config::default()
    };
    let app = query_app!(config);

    let req = test::TestRequest::post()
        .uri("/v1/query")
        .set_json(json!({"models": ["gemini-1.5-flash"], "prompt": "q"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "CLIENT_INIT_ERROR");
}
