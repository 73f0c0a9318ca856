//! Web UI: one question box, one answer area.
//!
//! | Route             | Purpose                                       |
//! |-------------------|-----------------------------------------------|
//! | `GET /`           | question page                                 |
//! | `POST /`          | form submission, renders the agent response   |
//! | `POST /api/invoke`| `{"input": ..}` in, `{"input", "output"}` out  |
//! | `GET /health`     | credential, turn state and index readiness    |

mod handlers;
mod page;

pub use handlers::{AskForm, InvokeRequest};
pub use page::{render_page, PageView, PAGE_TITLE};

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use crate::chatbot::Chatbot;

#[derive(Clone)]
pub struct AppState {
    pub chatbot: Arc<Chatbot>,
}

pub fn routes(chatbot: Arc<Chatbot>) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::ask))
        .route("/api/invoke", post(handlers::invoke))
        .route("/health", get(handlers::health))
        .with_state(AppState { chatbot })
}

/// Binds `host`, which may be a name such as `localhost` or an IP literal.
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

/// Serves the UI until the process is terminated.
pub async fn serve(chatbot: Arc<Chatbot>, listener: TcpListener) -> std::io::Result<()> {
    log::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, routes(chatbot)).await
}
