use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{
    page::{render_page, PageView},
    AppState,
};
use crate::{agent::AgentOutput, error::ChatbotError};

#[derive(Debug, Deserialize, Serialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvokeRequest {
    pub input: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_status(error: &ChatbotError) -> StatusCode {
    match error {
        ChatbotError::Busy => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn pretty(output: &AgentOutput) -> String {
    serde_json::to_string_pretty(output).unwrap_or_else(|_| output.output.clone())
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&PageView {
        credential: Some(state.chatbot.credential_status()),
        ..Default::default()
    }))
}

pub async fn ask(State(state): State<AppState>, Form(form): Form<AskForm>) -> Response {
    let credential = Some(state.chatbot.credential_status());
    match state.chatbot.ask(&form.question).await {
        Ok(output) => Html(render_page(&PageView {
            credential,
            question: &form.question,
            response: output.as_ref().map(pretty),
            error: None,
        }))
        .into_response(),
        Err(e) => {
            log::error!("Failed to answer {:?}: {}", form.question, e);
            let html = render_page(&PageView {
                credential,
                question: &form.question,
                response: None,
                error: Some(e.to_string()),
            });
            (error_status(&e), Html(html)).into_response()
        }
    }
}

pub async fn invoke(
    State(state): State<AppState>,
    Json(request): Json<InvokeRequest>,
) -> Response {
    match state.chatbot.ask(&request.input).await {
        Ok(Some(output)) => Json(output).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            log::error!("Failed to answer {:?}: {}", request.input, e);
            (
                error_status(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let chatbot = &state.chatbot;
    Json(json!({
        "status": "ok",
        "credential": chatbot.credential_status(),
        "state": chatbot.state(),
        "index_ready": chatbot.index().is_ready(),
        "tools": chatbot.tool_names(),
    }))
}
