//! Drone Navigation Webhook (s0404)
//!
//! ```text
//! POST /webhook  {"instruction": "..."}  ->  {"description": "<map tile>"}
//! GET  /health                           ->  "OK"
//! ```
//!
//! The grading host calls the webhook with a flight instruction in Polish;
//! the model walks a 4x4 map from the top-left tile and names the tile it
//! ends on. Bodies containing `{{` are template probes and are answered
//! without touching the model.

use crate::llm::ChatModel;
use crate::prompt::Prompt;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const DEFAULT_PORT: u16 = 3002;
pub const PROBE_MARKER: &str = "{{";
pub const PROBE_REPLY: &str = "thanks";

pub const MAP: &str = "<table>\n\
    <tr><td id=\"1\">punkt startowy</td><td id=\"2\">trawa</td><td id=\"3\">drzewo</td><td id=\"4\">dom</td></tr>\n\
    <tr><td id=\"5\">trawa</td><td id=\"6\">młyn</td><td id=\"7\">trawa</td><td id=\"8\">trawa</td></tr>\n\
    <tr><td id=\"9\">trawa</td><td id=\"10\">trawa</td><td id=\"11\">skały</td><td id=\"12\">dwa drzewa</td></tr>\n\
    <tr><td id=\"13\">skały</td><td id=\"14\">skały</td><td id=\"15\">samochód</td><td id=\"16\">jaskinia</td></tr>\n\
</table>\n";

pub fn system_prompt() -> String {
    format!(
        "Jesteś dronem który lata po mapie z 16 polami - mapa 4 x 4. Mapa po której się poruszasz została opisana za pomocą HTML i przedstawiona poniżej:\n{}\
Otrzymujesz instrukcje które będą opisywać jak powinieneś się przemieszczać po mapie. \
Instrukcja zawierać będzie również pytanie, które będzie wymagać od Ciebie podania informacji gdzie obecnie się znajdujesz po wykonaniu instrukcji.\n\
Odpowiedź powinna uwzględniać TYLKO opis pola z mapy np. trawa, dwa drzewa, jaskinia itp.\n\
Twoim punktem startowym jest pole z id=1 nazwane 'punkt startowy'\n\
Kilka przykładów:\n\
1. Instrukcja: 'Słuchaj kolego. Lecimy na maksa w prawo, a później ile wlezie w dół. Co tam widzisz?'. Odpowiedź: jaskinia.\n\
2. Instrukcja: 'Lecimy kolego teraz na sam dół mapy, a później ile tylko możemy polecimy w prawo. Teraz mała korekta o jedno pole do góry. Co my tam mamy?'. Odpowiedź: dwa drzewa.\n\
3. Instrukcja: 'Dobra. To co? zaczynamy? Odpalam silniki. Czas na kolejny lot. Jesteś moimi oczami. Lecimy w dół, albo nie! nie! czekaaaaj. Polecimy wiem jak. W prawo i dopiero teraz w dół. Tak będzie OK. Co widzisz?'. Odpowiedź: młyn.\n\
4. Instrukcja: 'Polecimy na sam dół mapy, a później o dwa pola w prawo. Co tam jest?'. Odpowiedź: samochód",
        MAP
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct Instruction {
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub description: String,
}

pub struct WebhookState {
    pub model: Arc<dyn ChatModel>,
    system_prompt: String,
}

impl WebhookState {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            system_prompt: system_prompt(),
        }
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn webhook(State(state): State<Arc<WebhookState>>, body: Bytes) -> Response {
    let content = String::from_utf8_lossy(&body);
    info!("Received request: {}", content);

    if content.contains(PROBE_MARKER) {
        warn!("Template probe received: {}", content);
        return (StatusCode::OK, PROBE_REPLY).into_response();
    }

    let instruction: Instruction = match serde_json::from_slice(&body) {
        Ok(i) => i,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response(),
    };

    let prompt = Prompt::new(state.system_prompt.as_str()).user(instruction.instruction);
    match prompt.send(state.model.as_ref()).await {
        Ok(completion) => {
            let description = completion.text.trim().to_string();
            info!("Model response: {}", description);
            Json(Description { description }).into_response()
        }
        Err(e) => {
            error!("Model call failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "something went wrong while calling external source",
            )
                .into_response()
        }
    }
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    warn!("Received non-POST request");
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook", post(webhook).fallback(method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(model: Arc<dyn ChatModel>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(Arc::new(WebhookState::new(model)));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Webhook listening on {}", addr);
    info!("  POST /webhook - drone instruction");
    info!("  GET  /health  - health check");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_contains_map() {
        let prompt = system_prompt();
        assert!(prompt.contains("<td id=\"16\">jaskinia</td>"));
        assert!(prompt.contains("pole z id=1 nazwane 'punkt startowy'"));
    }

    #[test]
    fn test_description_wire_format() {
        let json = serde_json::to_string(&Description {
            description: "skały".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"description":"skały"}"#);
    }
}
