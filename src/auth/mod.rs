mod login;
mod logout;
mod lookup;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(login::login_page))
        .route("/login", post(login::login))
        .route("/lookup", get(lookup::lookup))
        .route("/logout", get(logout::logout))
}
