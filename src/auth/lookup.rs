use axum::{debug_handler, extract::{Query, State}, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{profiles::{Profile, ProfileResolver}, session::{self, PROFILE_DRAFT}, AppResult, AppState};

#[derive(Deserialize)]
pub(crate) struct LookupQuery {
    #[serde(default)]
    pub(crate) username: String,
}

/// Re-resolves the username on every edit of the login field and answers
/// with the profile to preview, or `null`.
#[debug_handler(state = AppState)]
pub(crate) async fn lookup(
    Query(LookupQuery { username }): Query<LookupQuery>,
    State(resolver): State<ProfileResolver>,
    session: Session,
) -> AppResult<Json<Option<Profile>>> {
    let draft = session.get::<Profile>(PROFILE_DRAFT).await?;
    let draft = resolver.lookup(username.trim()).await.apply(draft);

    session::store_draft(&session, draft.as_ref()).await?;
    Ok(Json(draft))
}
