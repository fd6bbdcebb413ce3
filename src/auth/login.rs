use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{include_res, profiles::{Profile, ProfileResolver}, session::{PROFILE_DRAFT, USER_DATA}, AppResult, AppState};

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    pub(crate) username: String,
}

#[debug_handler]
pub(crate) async fn login_page() -> impl IntoResponse {
    Html(include_res!(str, "/pages/login.html"))
}

/// Stores whatever profile the username resolves to and heads to the chat.
///
/// An unresolved username still stores an empty profile; the chat view
/// sends the browser back here in that case.
#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(resolver): State<ProfileResolver>,
    session: Session,

    Form(LoginForm { username }): Form<LoginForm>,
) -> AppResult<Redirect> {
    let draft = session.remove::<Profile>(PROFILE_DRAFT).await?;
    let profile = resolver.lookup(username.trim()).await.apply(draft);

    match &profile {
        Some(profile) => tracing::info!(login = %profile.login, "logged in"),
        None => tracing::info!(%username, "login without a resolved profile"),
    }

    session.insert(USER_DATA, profile.unwrap_or_default()).await?;
    Ok(Redirect::to("/chat"))
}
