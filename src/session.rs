use tower_sessions::{session, Session};

use crate::profiles::Profile;

/// Profile of the logged in user.
pub const USER_DATA: &str = "user_data";
/// Profile shown on the login page while the username is being typed.
pub const PROFILE_DRAFT: &str = "profile_draft";

/// The stored profile, unless it is missing or empty.
pub async fn current_profile(session: &Session) -> Result<Option<Profile>, session::Error> {
    Ok(session
        .get::<Profile>(USER_DATA)
        .await?
        .filter(|profile| !profile.is_empty()))
}

pub async fn store_draft(session: &Session, draft: Option<&Profile>) -> Result<(), session::Error> {
    match draft {
        Some(profile) => session.insert(PROFILE_DRAFT, profile).await,
        None => session.remove::<Profile>(PROFILE_DRAFT).await.map(|_| ()),
    }
}
