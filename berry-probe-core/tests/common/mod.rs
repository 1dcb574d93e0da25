use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use std::time::Duration;

/// 启动一个模拟路由器，返回base URL
/// 聊天接口按请求体里的backend名字演不同的故障剧本
pub async fn spawn_mock_router() -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_handler))
        .route("/smart-ai/weights", get(weights_handler))
        .route("/models", get(models_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn chat_handler(Json(payload): Json<Value>) -> Response {
    let backend = payload["backend"].as_str().unwrap_or_default();
    let streaming = payload["stream"].as_bool().unwrap_or(false);

    match backend {
        "slow_backend" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            ok_completion(streaming)
        }
        "err_backend" => {
            let body = format!("internal error: {}", "x".repeat(300));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
        "bad_json_backend" => (StatusCode::OK, "plainly not json").into_response(),
        "empty_stream_backend" => (StatusCode::OK, String::new()).into_response(),
        "verbose_backend" => Json(json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": "p".repeat(60)
            }}]
        }))
        .into_response(),
        _ => ok_completion(streaming),
    }
}

fn ok_completion(streaming: bool) -> Response {
    if streaming {
        (
            StatusCode::OK,
            "data: {\"choices\":[{\"delta\":{\"content\":\"pong\"}}]}\n\ndata: [DONE]\n\n",
        )
            .into_response()
    } else {
        Json(json!({
            "choices": [{"message": {"role": "assistant", "content": "pong"}}]
        }))
        .into_response()
    }
}

async fn weights_handler() -> Json<Value> {
    Json(json!({
        "models": [
            {
                "name": "gpt-4o",
                "backends": [
                    {"provider": "openai_official", "model": "gpt-4o",
                     "effective_weight": 0.6, "confidence": 0.9,
                     "enabled": true, "is_premium": true},
                    {"provider": "azure_openai", "model": "gpt-4o",
                     "effective_weight": 0.4, "confidence": 0.8,
                     "enabled": true, "is_premium": false},
                    {"provider": "disabled_provider", "model": "gpt-4o",
                     "effective_weight": 0.1, "confidence": 0.2,
                     "enabled": false, "is_premium": false}
                ],
                "stats": {
                    "total_backends": 2,
                    "healthy_backends": 2,
                    "average_confidence": 0.85,
                    "premium_backends": 1
                }
            },
            {
                "name": "claude-sonnet-4",
                "backends": [
                    {"provider": "anthropic_claude", "model": "claude-sonnet-4",
                     "effective_weight": 1.0, "confidence": 0.95,
                     "enabled": true, "is_premium": false}
                ],
                "stats": {
                    "total_backends": 1,
                    "healthy_backends": 1,
                    "average_confidence": 0.95,
                    "premium_backends": 0
                }
            }
        ],
        "total_smart_ai_models": 2
    }))
}

async fn models_handler() -> Json<Value> {
    Json(json!({
        "data": [{"id": "gpt-4o"}, {"id": "claude-sonnet-4"}]
    }))
}
