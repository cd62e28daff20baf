//! End-to-end integration tests for the GodChat conversation relay.
//!
//! These tests exercise the full pipeline from request to reply,
//! including context assembly, the completion boundary, persistence
//! ordering, and the HTTP surface.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use godchat_core::completion::{CompletionClient, CompletionReply, Usage};
use godchat_core::error::{ChatError, CompletionError};
use godchat_core::prompt::Prompt;
use godchat_core::store::TranscriptStore;
use godchat_core::turn::{IncomingTurn, Role, SessionId};
use godchat_gateway::{GatewayState, build_router};
use godchat_orchestrator::{ChatOrchestrator, ChatRequest, ContextAssembler};
use godchat_transcript::InMemoryTranscript;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

// ── Mock completion client ───────────────────────────────────────────────

/// A completion client that returns one scripted outcome and records
/// every prompt it receives.
struct ScriptedClient {
    outcome: Result<CompletionReply, CompletionError>,
    prompts: std::sync::Mutex<Vec<Prompt>>,
}

impl ScriptedClient {
    fn replying(text: &str) -> Self {
        Self {
            outcome: Ok(CompletionReply {
                content: text.into(),
                model: "mock".into(),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
            }),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn failing(error: CompletionError) -> Self {
        Self {
            outcome: Err(error),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<CompletionReply, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.outcome.clone()
    }
}

fn orchestrator(
    store: Arc<InMemoryTranscript>,
    client: Arc<ScriptedClient>,
) -> ChatOrchestrator {
    ChatOrchestrator::new(
        store,
        client,
        ContextAssembler::new("You are AI God.", 10),
    )
}

fn user_request(session: &str, content: &str) -> ChatRequest {
    ChatRequest {
        session_id: session.into(),
        turns: vec![IncomingTurn::user(content)],
        client_memory: vec![],
    }
}

// ── E2E: full conversation flow ──────────────────────────────────────────

#[tokio::test]
async fn e2e_conversation_accumulates_context_across_requests() {
    let store = Arc::new(InMemoryTranscript::new());
    let client = Arc::new(ScriptedClient::replying("indeed"));
    let orch = orchestrator(store.clone(), client.clone());

    orch.handle(user_request("s1", "first question")).await.unwrap();
    orch.handle(user_request("s1", "second question")).await.unwrap();
    orch.handle(user_request("s1", "third question")).await.unwrap();

    // Six rows persisted: three user/assistant pairs, in order.
    let turns = store.history(&SessionId::from("s1"), 20).await.unwrap();
    assert_eq!(turns.len(), 6);
    let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
        ]
    );

    // The third prompt carried the two prior exchanges as stored history.
    let prompt = client.last_prompt().unwrap();
    let contents: Vec<&str> = prompt.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec![
            "You are AI God.",
            "first question",
            "indeed",
            "second question",
            "indeed",
            "third question",
        ]
    );
}

#[tokio::test]
async fn e2e_history_window_bounds_long_sessions() {
    let store = Arc::new(InMemoryTranscript::new());
    let client = Arc::new(ScriptedClient::replying("yes"));
    let orch = orchestrator(store.clone(), client.clone());

    // 12 exchanges = 24 stored turns, well past the window of 10.
    for i in 0..12 {
        orch.handle(user_request("s1", &format!("question {i}"))).await.unwrap();
    }

    // Storage keeps everything; the prompt carries only the window.
    assert_eq!(store.count(&SessionId::from("s1")).await.unwrap(), 24);
    let prompt = client.last_prompt().unwrap();
    // preamble + 10 history + 1 current
    assert_eq!(prompt.len(), 12);
}

#[tokio::test]
async fn e2e_client_memory_rides_along_without_persisting() {
    let store = Arc::new(InMemoryTranscript::new());
    let client = Arc::new(ScriptedClient::replying("welcome back"));
    let orch = orchestrator(store.clone(), client.clone());

    let request = ChatRequest {
        session_id: "s1".into(),
        turns: vec![IncomingTurn::user("do you remember me?")],
        client_memory: vec![
            IncomingTurn::user("hello"),
            IncomingTurn::assistant("greetings, mortal"),
        ],
    };
    orch.handle(request).await.unwrap();

    let prompt = client.last_prompt().unwrap();
    assert_eq!(prompt.len(), 4);
    assert_eq!(prompt.messages()[1].content, "hello");
    assert_eq!(prompt.messages()[2].content, "greetings, mortal");

    // Only the new exchange landed in the store.
    assert_eq!(store.count(&SessionId::from("s1")).await.unwrap(), 2);
}

#[tokio::test]
async fn e2e_concurrent_sessions_stay_isolated() {
    let store = Arc::new(InMemoryTranscript::new());
    let client = Arc::new(ScriptedClient::replying("ok"));
    let orch = Arc::new(orchestrator(store.clone(), client));

    let mut handles = Vec::new();
    for i in 0..4 {
        let orch = orch.clone();
        handles.push(tokio::spawn(async move {
            orch.handle(user_request(&format!("session-{i}"), "hello"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for i in 0..4 {
        let session = SessionId::from(&format!("session-{i}"));
        assert_eq!(store.count(&session).await.unwrap(), 2);
    }
}

#[tokio::test]
async fn e2e_gateway_failure_leaves_no_orphan_rows() {
    let store = Arc::new(InMemoryTranscript::new());
    let client = Arc::new(ScriptedClient::failing(CompletionError::Upstream {
        status: 500,
        message: "model melted".into(),
    }));
    let orch = orchestrator(store.clone(), client.clone());

    let err = orch.handle(user_request("s1", "hello")).await.unwrap_err();
    assert!(matches!(err, ChatError::Upstream { status: 500, .. }));
    assert_eq!(client.calls(), 1);
    assert_eq!(store.count(&SessionId::from("s1")).await.unwrap(), 0);

    // The session remains usable afterwards — the failed request left no trace.
    let recovered = orchestrator(store.clone(), Arc::new(ScriptedClient::replying("back")));
    recovered.handle(user_request("s1", "hello again")).await.unwrap();
    assert_eq!(store.count(&SessionId::from("s1")).await.unwrap(), 2);
}

// ── E2E: HTTP surface ────────────────────────────────────────────────────

fn http_app(client: ScriptedClient) -> axum::Router {
    let store: Arc<dyn TranscriptStore> = Arc::new(InMemoryTranscript::new());
    let state = Arc::new(GatewayState {
        orchestrator: ChatOrchestrator::new(
            store,
            Arc::new(client),
            ContextAssembler::new("You are AI God.", 10),
        ),
        admin_token: None,
    });
    build_router(state)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn e2e_http_chat_and_history() {
    let app = http_app(ScriptedClient::replying("hi"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "session_id": "web-1",
                        "turns": [{"role": "user", "content": "hello"}],
                        "client_memory": [{"role": "user", "content": "hello"}]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["role"], "assistant");
    assert_eq!(body["content"], "hi");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/history?session_id=web-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["turns"][0]["content"], "hello");
    assert_eq!(body["turns"][1]["content"], "hi");
}

#[tokio::test]
async fn e2e_http_upstream_error_maps_to_502() {
    let app = http_app(ScriptedClient::failing(CompletionError::Upstream {
        status: 429,
        message: "rate limited".into(),
    }));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "session_id": "web-1",
                        "turns": [{"role": "user", "content": "hello"}]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "rate limited");
}
