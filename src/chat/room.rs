use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{include_res, res::escape_html, session, store::SharedStore, AppResult, AppState, Stickers};

use super::{composer::Composer, feed::ChatFeed, msg::msg_to_html};

#[derive(Deserialize)]
pub(crate) struct SendMessageForm {
    text: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn room(
    State(store): State<SharedStore>,
    State(Stickers(stickers)): State<Stickers>,
    session: Session,
) -> AppResult<Response> {
    let Some(profile) = session::current_profile(&session).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let history = store.select_latest().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to load messages");
        Vec::new()
    });
    let feed = ChatFeed::new(history);

    let message_items: String = feed.messages().iter().map(msg_to_html).collect();
    let sticker_items: String = stickers
        .iter()
        .map(|url| include_res!(str, "/pages/chat/sticker.html").replace("{url}", &escape_html(url)))
        .collect();

    Ok(Html(
        include_res!(str, "/pages/chat/room.html")
            .replace("{avatar_url}", &escape_html(&profile.avatar_url))
            .replace("{name}", &escape_html(profile.display_name()))
            .replace("{sticker_items}", &sticker_items)
            .replace("{message_items}", &message_items)
    ).into_response())
}

/// Form fallback for browsers without the websocket.
#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(store): State<SharedStore>,
    session: Session,

    Form(SendMessageForm { text }): Form<SendMessageForm>,
) -> AppResult<Redirect> {
    let Some(profile) = session::current_profile(&session).await? else {
        return Ok(Redirect::to("/"));
    };

    let mut composer = Composer::default();
    composer.set_input(text);
    composer.submit(&store, &profile);

    Ok(Redirect::to("/chat"))
}
