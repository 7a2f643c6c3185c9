//! WebSocket upgrade + message loop for the assistant chat. Each client message
//! is parsed as JSON and forwarded to core logic. An `ask` is acknowledged with
//! `pending` before the reply arrives.
//!
//! A connection is served serially: while a question is in flight, later
//! frames (including `ping`) wait until its reply has been sent.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "hydralearn_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "hydralearn_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(ClientWsMessage::Ask { question, context, session_id }) if !question.trim().is_empty() => {
            if send(&mut socket, &ServerWsMessage::Pending).await.is_err() { break; }
            debug!(target: "assistant", question_len = question.len(), "WS ask accepted");
            ask(&state, &question, context.as_deref(), session_id.as_deref()).await
          }
          Ok(incoming) => handle_client_ws(incoming),
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        if send(&mut socket, &reply).await.is_err() { break; }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "hydralearn_backend", "WebSocket disconnected");
}

async fn ask(state: &AppState, question: &str, context: Option<&str>, session_id: Option<&str>) -> ServerWsMessage {
  match state.ask_assistant(question, context, session_id).await {
    Ok(text) => ServerWsMessage::AssistantReply { text },
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

/// Messages answered without touching the assistant.
fn handle_client_ws(msg: ClientWsMessage) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,
    ClientWsMessage::Ask { .. } => ServerWsMessage::Error { message: "question must not be empty".into() },
  }
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "hydralearn_backend", error = %e, "WS send error");
    e
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_messages_parse() {
    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"ask","question":"Lực là gì?","sessionId":"abc"}"#).unwrap();
    match m {
      ClientWsMessage::Ask { question, context, session_id } => {
        assert_eq!(question, "Lực là gì?");
        assert_eq!(context, None);
        assert_eq!(session_id.as_deref(), Some("abc"));
      }
      other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"ping"}"#).unwrap(), ClientWsMessage::Ping));
  }

  #[test]
  fn server_messages_are_tagged() {
    assert_eq!(serde_json::to_string(&ServerWsMessage::Pending).unwrap(), r#"{"type":"pending"}"#);
    assert_eq!(
      serde_json::to_string(&ServerWsMessage::AssistantReply { text: "ok".into() }).unwrap(),
      r#"{"type":"assistant_reply","text":"ok"}"#
    );
    assert!(matches!(handle_client_ws(ClientWsMessage::Ping), ServerWsMessage::Pong));
  }

  async fn next_json<S>(ws: &mut S) -> serde_json::Value
  where
    S: futures_util::Stream<Item = Result<tokio_tungstenite::tungstenite::Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
  {
    use futures_util::StreamExt;
    use tokio_tungstenite::tungstenite::Message as WsMessage;
    loop {
      match ws.next().await {
        Some(Ok(WsMessage::Text(txt))) => return serde_json::from_str(&txt).unwrap(),
        Some(Ok(_)) => continue,
        other => panic!("socket closed: {other:?}"),
      }
    }
  }

  #[tokio::test]
  async fn ask_over_socket_sends_pending_then_reply() {
    use futures_util::SinkExt;
    use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

    use crate::assistant::AssistantGateway;
    use crate::config::Prompts;

    let state = Arc::new(AppState::with_gateway(AssistantGateway::new(None, Prompts::default())));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, crate::routes::build_router(state)).await.unwrap();
    });

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    ws.send(WsMessage::text(r#"{"type":"ask","question":"Áp suất là gì?"}"#.to_string())).await.unwrap();
    assert_eq!(next_json(&mut ws).await["type"], "pending");
    let reply = next_json(&mut ws).await;
    assert_eq!(reply["type"], "assistant_reply");
    assert_eq!(reply["text"], Prompts::default().not_configured);

    ws.send(WsMessage::text(r#"{"type":"ask","question":"  "}"#.to_string())).await.unwrap();
    assert_eq!(next_json(&mut ws).await["type"], "error");

    ws.send(WsMessage::text("not json".to_string())).await.unwrap();
    assert_eq!(next_json(&mut ws).await["type"], "error");

    ws.send(WsMessage::text(r#"{"type":"ping"}"#.to_string())).await.unwrap();
    assert_eq!(next_json(&mut ws).await["type"], "pong");
  }
}
