pub mod composer;
pub mod feed;
pub mod msg;
mod room;
mod ws;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(room::room).post(room::send))
        .route("/ws", get(ws::room_ws))
}
