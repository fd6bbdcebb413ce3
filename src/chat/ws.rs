use axum::{
    debug_handler,
    extract::{
        ws::{Message as WsMessage, WebSocket},
        State, WebSocketUpgrade,
    },
    response::{IntoResponse, Redirect, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tower_sessions::Session;

use crate::{profiles::Profile, session, store::SharedStore, AppResult, AppState};

use super::{composer::Composer, feed::ChatFeed, msg::{msg_to_html, Outgoing}};

const UPDATE_BUFFER: usize = 64;

#[debug_handler(state = AppState)]
pub(crate) async fn room_ws(
    State(store): State<SharedStore>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let Some(profile) = session::current_profile(&session).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    Ok(ws.on_upgrade(move |stream| live(stream, store, profile)))
}

/// Pushes inserted rows to the page and sends what the page submits, until
/// either side goes away.
async fn live(stream: WebSocket, store: SharedStore, profile: Profile) {
    let (mut sender, mut receiver) = stream.split();
    let (updates_tx, mut updates) = mpsc::channel(UPDATE_BUFFER);
    let feed = ChatFeed::default().spawn(store.subscribe(), updates_tx);

    tracing::info!(login = %profile.login, "entered chat");

    let mut forward_task = tokio::spawn(async move {
        while let Some(message) = updates.recv().await {
            if sender.send(msg_to_html(&message).into()).await.is_err() {
                break;
            }
        }
    });

    let mut composer = Composer::default();
    loop {
        tokio::select! {
            _ = &mut forward_task => break,
            frame = receiver.next() => {
                let Some(Ok(frame)) = frame else {
                    break;
                };
                if let WsMessage::Close(_) = frame {
                    break;
                }
                let Ok(outgoing) = serde_json::from_slice::<Outgoing>(&frame.into_data()) else {
                    continue;
                };

                composer.set_input(outgoing.into_text());
                composer.submit(&store, &profile);
            }
        }
    }

    forward_task.abort();
    match feed.unsubscribe().await {
        Ok(feed) => tracing::info!(
            login = %profile.login,
            received = feed.messages().len(),
            still_watching = store.subscriber_count(),
            "left chat"
        ),
        Err(e) => tracing::warn!(error = %e, "chat feed task failed"),
    }
}
