//! WebSocket event channel
//!
//! The persistent connection the browser uses to start runs, update the
//! step order, and receive pipeline lifecycle events.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use sheetflow_core::domain::event::PipelineEvent;

use crate::state::AppState;

/// Client → server message envelope
///
/// `data` is optional because `start_pipeline` may be sent without a
/// step order.
#[derive(Debug, Deserialize)]
struct ClientEnvelope {
    event: ClientEventKind,
    #[serde(default)]
    data: Option<StepOrderPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ClientEventKind {
    StartPipeline,
    UpdatePipelineConfig,
}

#[derive(Debug, Deserialize)]
struct StepOrderPayload {
    steps: Vec<String>,
}

/// GET /ws
/// Upgrades to the pipeline event channel
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    debug!("client connected");

    let (mut sink, mut stream) = socket.split();
    let mut events = state.events.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("failed to serialize pipeline event: {e}");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("event stream lagged, {skipped} event(s) dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => handle_client_message(&state, text.as_str()),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("websocket error: {e}");
                    break;
                }
            },
        }
    }

    debug!("client disconnected");
}

fn handle_client_message(state: &AppState, text: &str) {
    let envelope: ClientEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("ignoring malformed client message: {e}");
            return;
        }
    };

    match envelope.event {
        ClientEventKind::StartPipeline => {
            debug!("starting pipeline execution");
            state.runner.start(envelope.data.map(|payload| payload.steps));
        }
        ClientEventKind::UpdatePipelineConfig => {
            let Some(payload) = envelope.data else {
                warn!("configuration update without step order");
                state
                    .events
                    .send(PipelineEvent::PipelineConfigUpdated { success: false });
                return;
            };

            let success = match state.registry.reorder(&payload.steps) {
                Ok(()) => true,
                Err(e) => {
                    warn!("rejected pipeline configuration: {e}");
                    false
                }
            };
            state
                .events
                .send(PipelineEvent::PipelineConfigUpdated { success });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_without_data() {
        let envelope: ClientEnvelope = serde_json::from_str(r#"{"event": "start_pipeline"}"#).unwrap();
        assert_eq!(envelope.event, ClientEventKind::StartPipeline);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_parse_start_with_step_order() {
        let envelope: ClientEnvelope = serde_json::from_str(
            r#"{"event": "start_pipeline", "data": {"steps": ["excel_macro"]}}"#,
        )
        .unwrap();
        assert_eq!(envelope.event, ClientEventKind::StartPipeline);
        assert_eq!(envelope.data.unwrap().steps, vec!["excel_macro"]);
    }

    #[test]
    fn test_parse_config_update() {
        let envelope: ClientEnvelope = serde_json::from_str(
            r#"{"event": "update_pipeline_config", "data": {"steps": ["same_sheet_transfer", "excel_macro", "different_sheet_transfer"]}}"#,
        )
        .unwrap();
        assert_eq!(envelope.event, ClientEventKind::UpdatePipelineConfig);
        assert_eq!(envelope.data.unwrap().steps.len(), 3);
    }

    #[test]
    fn test_unknown_event_fails_to_parse() {
        let result = serde_json::from_str::<ClientEnvelope>(r#"{"event": "shutdown"}"#);
        assert!(result.is_err());
    }
}
