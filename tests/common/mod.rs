//! In-process mock endpoints shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use m365_assistant::auth::{DeviceCodeAuthProvider, DeviceCodePrompt};
use m365_assistant::config::{AppConfig, AppSettings, AzureOpenAiConfig, GraphAuthConfig};

/// Bind a router on an ephemeral local port and serve it for the duration
/// of the test.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });
    format!("http://{addr}")
}

/// Queue of canned replies plus a record of how the endpoint was called.
#[derive(Clone)]
pub struct ScriptedEndpoint {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl ScriptedEndpoint {
    pub fn new(replies: Vec<(StatusCode, Value)>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            hits: Arc::new(AtomicUsize::new(0)),
            bodies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Request bodies (or headers, where the route records those) in call
    /// order.
    pub async fn seen(&self) -> Vec<String> {
        self.bodies.lock().await.clone()
    }

    async fn respond(&self, recorded: String) -> (StatusCode, Json<Value>) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().await.push(recorded);
        let (status, value) = self
            .replies
            .lock()
            .await
            .pop_front()
            .expect("mock endpoint ran out of scripted replies");
        (status, Json(value))
    }
}

fn scripted_post(endpoint: &ScriptedEndpoint) -> axum::routing::MethodRouter {
    let endpoint = endpoint.clone();
    post(move |body: String| {
        let endpoint = endpoint.clone();
        async move { endpoint.respond(body).await }
    })
}

/// Identity endpoints: device authorization plus a scripted token endpoint.
pub fn identity_router(device_auth: &ScriptedEndpoint, token: &ScriptedEndpoint) -> Router {
    Router::new()
        .route("/oauth2/v2.0/devicecode", scripted_post(device_auth))
        .route("/oauth2/v2.0/token", scripted_post(token))
}

/// Chat-completions endpoint for the Azure OpenAI mock.
pub fn llm_router(chat: &ScriptedEndpoint) -> Router {
    Router::new().route(
        "/openai/deployments/{deployment}/chat/completions",
        scripted_post(chat),
    )
}

/// Graph `/me` endpoint; records the Authorization header of each call.
pub fn graph_router(me: &ScriptedEndpoint) -> Router {
    let endpoint = me.clone();
    Router::new().route(
        "/v1.0/me",
        get(move |headers: HeaderMap| {
            let endpoint = endpoint.clone();
            async move {
                let authorization = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                endpoint.respond(authorization).await
            }
        }),
    )
}

pub fn device_authorization_body() -> Value {
    json!({
        "device_code": "mock-device-code",
        "user_code": "ABCD-EFGH",
        "verification_uri": "https://microsoft.com/devicelogin",
        "expires_in": 900,
        "interval": 0,
        "message": "To sign in, open https://microsoft.com/devicelogin and enter the code ABCD-EFGH."
    })
}

pub fn token_success_body(
    access_token: &str,
    refresh_token: Option<&str>,
    expires_in: u64,
) -> Value {
    let mut body = json!({
        "token_type": "Bearer",
        "access_token": access_token,
        "expires_in": expires_in,
        "scope": "User.Read Mail.ReadWrite",
    });
    if let Some(refresh_token) = refresh_token {
        body["refresh_token"] = json!(refresh_token);
    }
    body
}

pub fn authorization_pending_body() -> Value {
    json!({
        "error": "authorization_pending",
        "error_description": "The user has not yet completed the sign-in."
    })
}

pub fn chat_completion_body(content: &str, usage: (u32, u32, u32)) -> Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ],
        "usage": {
            "prompt_tokens": usage.0,
            "completion_tokens": usage.1,
            "total_tokens": usage.2
        }
    })
}

pub fn user_profile_body() -> Value {
    json!({
        "displayName": "Test User",
        "mail": "test@example.com",
        "userPrincipalName": "test@example.com"
    })
}

pub fn test_graph_config(authority: &str) -> GraphAuthConfig {
    GraphAuthConfig {
        client_id: "test-client-id".to_string(),
        authority: authority.to_string(),
        scopes: vec!["User.Read".to_string(), "offline_access".to_string()],
    }
}

pub fn test_config(llm_url: &str, authority: &str) -> AppConfig {
    AppConfig {
        azure_openai: AzureOpenAiConfig {
            endpoint: llm_url.to_string(),
            api_key: "test-key".to_string(),
            deployment: "gpt-4o".to_string(),
            api_version: "2025-01-01-preview".to_string(),
        },
        app: AppSettings {
            polling_interval_minutes: 15,
            log_level: "debug".to_string(),
            data_retention_days: 90,
        },
        graph: test_graph_config(authority),
    }
}

/// Provider whose sign-in prompts are captured instead of rendered.
pub fn provider_with_prompt_capture(
    graph: GraphAuthConfig,
) -> (DeviceCodeAuthProvider, Arc<StdMutex<Vec<DeviceCodePrompt>>>) {
    let prompts = Arc::new(StdMutex::new(Vec::new()));
    let sink = prompts.clone();
    let provider = DeviceCodeAuthProvider::new(
        graph,
        Box::new(move |prompt| sink.lock().expect("prompt sink").push(prompt.clone())),
    );
    (provider, prompts)
}
