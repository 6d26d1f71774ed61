use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use serde_json::json;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::message::Message;
use crate::runtime::{RenderOutput, RuntimeEvent};
use crate::view::Node;

use super::error::ApiError;
use super::sessions::SessionManager;
use super::shutdown::ShutdownManager;

#[derive(Clone)]
pub struct ServerState {
    pub sessions: Arc<SessionManager>,
    pub shutdown: Arc<ShutdownManager>,
}

#[derive(Debug, Serialize)]
struct CreatedSession {
    session_id: Uuid,
    revision: u64,
    view: Node,
}

pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(render_session).delete(close_session))
        .route("/sessions/{id}/messages", post(submit_message))
        .route("/sessions/{id}/events", get(session_events))
        .with_state(state)
}

async fn health(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "fasttea",
        "app": state.sessions.app().name(),
        "sessions": state.sessions.len(),
    }))
}

async fn create_session(State(state): State<ServerState>) -> Result<impl IntoResponse, ApiError> {
    let (session_id, port) = state.sessions.create()?;
    let output = port.render().await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedSession {
            session_id,
            revision: output.revision,
            view: output.view,
        }),
    ))
}

async fn render_session(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderOutput>, ApiError> {
    let port = state.sessions.get(id)?;
    Ok(Json(port.render().await?))
}

async fn submit_message(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    body: Result<Json<Message>, JsonRejection>,
) -> Result<Json<RenderOutput>, ApiError> {
    let port = state.sessions.get(id)?;
    let Json(message) = body?;
    tracing::debug!(session = %id, action = %message.action, "Message received");
    Ok(Json(port.submit(message).await?))
}

async fn close_session(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Server-sent events for one session, starting with its current view.
///
/// The stream ends when the session stops or the server shuts down. While
/// it is open the session is never swept as idle.
async fn session_events(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let (port, watching) = state.sessions.watch(id)?;
    // Subscribe before rendering so nothing committed in between is missed.
    let receiver = port.subscribe();
    let current = port.render().await?;
    drop(port);

    let shutdown = state.shutdown.clone();
    let events = stream::once(async move { RuntimeEvent::Rendered(current) })
        .chain(event_stream(id, receiver))
        .take_until(async move { shutdown.signaled().await })
        .map(move |event| {
            let _watching = &watching;
            Event::default().event(event.name()).json_data(&event)
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn event_stream(
    id: Uuid,
    receiver: broadcast::Receiver<RuntimeEvent>,
) -> impl Stream<Item = RuntimeEvent> {
    stream::unfold(receiver, move |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => return Some((event, receiver)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(session = %id, skipped, "Event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!(session = %id, "Event stream closed");
                    return None;
                }
            }
        }
    })
}
