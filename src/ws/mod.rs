// Live channel to the dashboard, one socket per logged-in farmer

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    Extension,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::middleware::AuthUser;
use crate::state::AppState;

/// Frame format in both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: String,
}

impl WsMessage {
    pub fn new(kind: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }
}

/// Answer for an incoming text frame, if any. Unparseable frames and
/// unknown types are ignored.
pub fn reply(frame: &str) -> Option<WsMessage> {
    let message: WsMessage = serde_json::from_str(frame).ok()?;
    match message.kind.as_str() {
        "ping" => Some(WsMessage::new("pong", "alive")),
        _ => None,
    }
}

struct ClientEntry {
    id: u64,
    tx: mpsc::UnboundedSender<WsMessage>,
}

/// Connected clients keyed by username
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<Mutex<HashMap<String, ClientEntry>>>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry").finish_non_exhaustive()
    }
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the connection, replacing any older one for the same user.
    /// Returns the id needed to unregister it.
    pub async fn register(&self, username: &str, tx: mpsc::UnboundedSender<WsMessage>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let replaced = self
            .clients
            .lock()
            .await
            .insert(username.to_string(), ClientEntry { id, tx });
        if replaced.is_some() {
            debug!("Replaced existing WebSocket for {}", username);
        }
        id
    }

    /// Remove the entry only if it is still the connection `id`
    pub async fn unregister(&self, username: &str, id: u64) -> bool {
        let mut clients = self.clients.lock().await;
        match clients.get(username) {
            Some(entry) if entry.id == id => {
                clients.remove(username);
                true
            }
            _ => false,
        }
    }

    pub async fn send_to(&self, username: &str, message: WsMessage) -> bool {
        let clients = self.clients.lock().await;
        clients
            .get(username)
            .map(|entry| entry.tx.send(message).is_ok())
            .unwrap_or(false)
    }

    pub async fn contains(&self, username: &str) -> bool {
        self.clients.lock().await.contains_key(username)
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// `GET /ws`, mounted behind `require_auth`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> impl IntoResponse {
    info!("WebSocket upgrade for {}", user.username);
    let clients = state.clients.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, clients, user.username))
}

async fn handle_socket(socket: WebSocket, clients: ClientRegistry, username: String) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    let id = clients.register(&username, tx.clone()).await;

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&message) else {
                continue;
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Some(answer) = reply(&text) {
                    let _ = tx.send(answer);
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket read error for {}: {}", username, e);
                break;
            }
        }
    }

    clients.unregister(&username, id).await;
    writer.abort();
    info!("WebSocket closed for {}", username);
}
