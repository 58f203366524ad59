use rocket::futures::{SinkExt, StreamExt};
use rocket::{get, State};
use rocket_ws::{Channel, Message, WebSocket};
use tracing::{debug, error, info};

use crate::orchestrator::CycleState;

fn snapshot_message(state: &CycleState) -> Option<Message> {
    match serde_json::to_string(state) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            error!(error = %e, "failed to serialize cycle state");
            None
        }
    }
}

/// Pushes the current cycle state on connect and after every transition.
#[get("/cycles")]
pub fn cycle_updates(ws: WebSocket, state: &State<super::AppState>) -> Channel<'static> {
    let mut updates = state.orchestrator.subscribe();

    ws.channel(move |mut stream| {
        Box::pin(async move {
            info!("cycle subscriber connected");

            let snapshot = updates.borrow_and_update().clone();
            if let Some(message) = snapshot_message(&snapshot) {
                stream.send(message).await?;
            }

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            // Orchestrator dropped; nothing more will come.
                            break;
                        }
                        let snapshot = updates.borrow_and_update().clone();
                        debug!(cycle = snapshot.cycle, phase = ?snapshot.phase, "pushing cycle update");
                        if let Some(message) = snapshot_message(&snapshot) {
                            if let Err(e) = stream.send(message).await {
                                error!("Failed to push cycle update: {}", e);
                                break;
                            }
                        }
                    }
                    incoming = stream.next() => {
                        match incoming {
                            Some(Ok(Message::Close(_))) | None => {
                                info!("cycle subscriber disconnected");
                                break;
                            }
                            Some(Err(e)) => {
                                error!("WebSocket error: {}", e);
                                break;
                            }
                            _ => {}
                        }
                    }
                }
            }

            Ok(())
        })
    })
}
