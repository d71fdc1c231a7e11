//! HTTP route handlers and the websocket inspection session.
//!
//! Each socket owns one [`InspectionStore`]. The session loop waits on the
//! next client command or the earliest debounce deadline, whichever comes
//! first, and pushes a fresh `view` message after every state change.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::{Html, Response},
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::citations::parse_citations;
use crate::models::{CriteriaTab, MatchKind, ScrollTarget};
use crate::session::InspectionStore;
use crate::templates::{criteria_list, inspection_page};
use crate::AppState;

/// Characters of located text handed to the client for offset scrolling.
const SCROLL_TEXT_CHARS: usize = 40;

// ============================================================================
// Index Handler
// ============================================================================

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let store = state.new_store();
    Html(inspection_page(
        &store.visible_guidelines(),
        store.active_tab(),
        &store.render_html(),
    ))
}

// ============================================================================
// Client Commands
// ============================================================================

/// A message sent by the page over the session socket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    Search { query: String },
    CitationSearch { query: String },
    Next { kind: MatchKind },
    Previous { kind: MatchKind },
    Clear { kind: MatchKind },
    Activate { guideline: String },
    /// Raw descriptors shown against `document`, or the review note when absent.
    ActivateCitations {
        citations: Vec<String>,
        #[serde(default)]
        document: Option<String>,
    },
    Close,
    Reset,
    Tab { tab: CriteriaTab },
}

/// Apply one command to the store. Returns a message for the client when
/// the command could not be carried out.
pub fn apply_command(store: &mut InspectionStore, command: ClientCommand, now: Instant) -> Option<String> {
    match command {
        ClientCommand::Search { query } => store.set_search_query(query, now),
        ClientCommand::CitationSearch { query } => store.set_citation_query(query, now),
        ClientCommand::Next { kind } => store.next(kind),
        ClientCommand::Previous { kind } => store.previous(kind),
        ClientCommand::Clear { kind: MatchKind::Search } => store.clear_search(),
        ClientCommand::Clear { kind: MatchKind::Citation } => store.clear_citation_search(),
        ClientCommand::Activate { guideline } => {
            if store.activate_guideline(&guideline).is_none() {
                return Some(format!("guideline {} has no sources to show", guideline));
            }
        }
        ClientCommand::ActivateCitations { citations, document } => {
            let document = document.unwrap_or_else(|| store.review().note.clone());
            store.activate_citations(parse_citations(&citations), document);
        }
        ClientCommand::Close => store.close_citations(),
        ClientCommand::Reset => store.clear_citations(),
        ClientCommand::Tab { tab } => store.set_active_tab(tab),
    }
    None
}

// ============================================================================
// View Messages
// ============================================================================

pub fn view_message(store: &InspectionStore) -> serde_json::Value {
    let state = store.snapshot();
    let scroll_text = match state.scroll {
        Some(ScrollTarget::Offset { offset }) => Some(
            store
                .document()
                .chars()
                .skip(offset)
                .take(SCROLL_TEXT_CHARS)
                .collect::<String>(),
        ),
        _ => None,
    };
    json!({
        "type": "view",
        "html": store.render_html(),
        "criteria": criteria_list(&store.visible_guidelines()),
        "state": state,
        "scroll_text": scroll_text,
    })
}

fn error_message(message: &str) -> serde_json::Value {
    json!({ "type": "error", "message": message })
}

// ============================================================================
// WebSocket Session
// ============================================================================

pub async fn ws_handler(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let (ws_tx, ws_rx) = socket.split();
    info!("inspection session opened");
    run_session(ws_tx, ws_rx, state.new_store()).await;
    info!("inspection session closed");
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn send_json<Tx>(tx: &mut Tx, value: &serde_json::Value) -> bool
where
    Tx: Sink<Message> + Unpin,
{
    tx.send(Message::Text(value.to_string().into())).await.is_ok()
}

/// Drive one inspection session until the client goes away.
pub async fn run_session<Tx, Rx, E>(mut tx: Tx, mut rx: Rx, mut store: InspectionStore)
where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    if !send_json(&mut tx, &view_message(&store)).await {
        return;
    }

    loop {
        let deadline = store.next_deadline();
        tokio::select! {
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientCommand>(text.as_str()) {
                            Ok(command) => {
                                debug!(?command, "session command");
                                if let Some(problem) = apply_command(&mut store, command, Instant::now()) {
                                    if !send_json(&mut tx, &error_message(&problem)).await {
                                        break;
                                    }
                                }
                            }
                            Err(err) => {
                                warn!(error = %err, "ignoring malformed session command");
                                continue;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        debug!(error = %err, "session socket error");
                        break;
                    }
                    _ => continue,
                }
            }
            _ = wait_until(deadline) => {
                if !store.poll(Instant::now()) {
                    continue;
                }
            }
        }

        if !send_json(&mut tx, &view_message(&store)).await {
            break;
        }
    }
}
