use axum::{debug_handler, extract::Query, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{profiles::Profile, session::USER_DATA, AppResult};

#[derive(Deserialize)]
pub(crate) struct LogoutQuery {
    pub(crate) return_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn logout(
    Query(LogoutQuery { return_url }): Query<LogoutQuery>,
    session: Session
) -> AppResult<Redirect> {
    if let Some(profile) = session.remove::<Profile>(USER_DATA).await? {
        tracing::info!(login = %profile.login, "logged out");
    }
    // local paths only
    let return_url = return_url
        .as_deref()
        .filter(|url| url.starts_with('/') && !url.starts_with("//"))
        .unwrap_or("/");
    Ok(Redirect::to(return_url))
}
