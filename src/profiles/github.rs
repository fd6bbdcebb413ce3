use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::{FieldError, GetField};

use super::{Lookup, Profile};

/// Usernames at or below this length are never looked up.
pub const MIN_LOOKUP_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("user {0} not found")]
    NotFound(String),

    #[error("profile API returned {0}")]
    Status(StatusCode),

    #[error("profile request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed profile: {0}")]
    Malformed(#[from] FieldError),
}

/// Resolves usernames against the GitHub users API.
#[derive(Clone, Debug)]
pub struct ProfileResolver {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl ProfileResolver {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self, ProfileError> {
        let client = Client::builder()
            .user_agent(concat!("stickerchat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            token,
        })
    }

    /// Looks `username` up, logging and folding every failure into [`Lookup::Failed`].
    pub async fn lookup(&self, username: &str) -> Lookup {
        if username.chars().count() <= MIN_LOOKUP_LEN {
            return Lookup::Cleared;
        }

        match self.fetch(username).await {
            Ok(profile) => {
                tracing::debug!(login = %profile.login, "profile resolved");
                Lookup::Found(profile)
            }
            Err(ProfileError::NotFound(username)) => {
                tracing::info!(%username, "user not found");
                Lookup::Failed
            }
            Err(e) => {
                tracing::warn!(%username, error = %e, "profile lookup failed");
                Lookup::Failed
            }
        }
    }

    pub async fn fetch(&self, username: &str) -> Result<Profile, ProfileError> {
        let mut request = self
            .client
            // one path segment, whatever the user typed
            .get(format!("{}/users/{}", self.api_url, urlencoding::encode(username)))
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ProfileError::NotFound(username.to_owned()));
        }
        if !response.status().is_success() {
            return Err(ProfileError::Status(response.status()));
        }

        let body: serde_json::Value = response.json().await?;

        Ok(Profile {
            avatar_url: body.get_opt_str_field("avatar_url")?.unwrap_or_default(),
            login: body.get_str_field("login")?,
            email: body.get_opt_str_field("email")?,
            name: body.get_opt_str_field("name")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode, Uri},
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    use super::*;

    async fn user(
        Path(username): Path<String>,
        State(hits): State<Arc<AtomicUsize>>,
        headers: HeaderMap,
    ) -> Response {
        hits.fetch_add(1, Ordering::SeqCst);

        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer t0ken") {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        if username != "octocat" {
            return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response();
        }

        Json(json!({
            "login": "octocat",
            "id": 583231,
            "avatar_url": "https://avatars.example/u/583231",
            "name": "The Octocat",
            "email": null,
            "company": "@github",
        }))
        .into_response()
    }

    async fn fake_api() -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/users/{username}", get(user))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (format!("http://{addr}"), hits)
    }

    async fn record_path(State(paths): State<Arc<Mutex<Vec<String>>>>, uri: Uri) -> Response {
        paths.lock().unwrap().push(uri.to_string());
        (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response()
    }

    async fn anything(State(paths): State<Arc<Mutex<Vec<String>>>>, uri: Uri) -> Response {
        paths.lock().unwrap().push(uri.to_string());
        Json(json!({ "login": "someone-else", "avatar_url": "" })).into_response()
    }

    #[tokio::test]
    async fn usernames_stay_inside_the_users_path() {
        let paths = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/users/{username}", get(record_path))
            .fallback(anything)
            .with_state(paths.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let resolver = ProfileResolver::new(format!("http://{addr}"), Some("t0ken".to_owned())).unwrap();
        assert_eq!(resolver.lookup("../orgs/acme/members?x=").await, Lookup::Failed);
        assert_eq!(resolver.lookup("a/b#c").await, Lookup::Failed);

        assert_eq!(
            *paths.lock().unwrap(),
            vec![
                "/users/..%2Forgs%2Facme%2Fmembers%3Fx%3D".to_owned(),
                "/users/a%2Fb%23c".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn short_usernames_never_hit_the_network() {
        let (url, hits) = fake_api().await;
        let resolver = ProfileResolver::new(url, Some("t0ken".to_owned())).unwrap();

        assert_eq!(resolver.lookup("").await, Lookup::Cleared);
        assert_eq!(resolver.lookup("oc").await, Lookup::Cleared);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn found_profile_has_exactly_the_extracted_fields() {
        let (url, hits) = fake_api().await;
        let resolver = ProfileResolver::new(url, Some("t0ken".to_owned())).unwrap();

        let expected = Profile {
            avatar_url: "https://avatars.example/u/583231".to_owned(),
            login: "octocat".to_owned(),
            email: None,
            name: Some("The Octocat".to_owned()),
        };
        assert_eq!(resolver.lookup("octocat").await, Lookup::Found(expected));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_user_fails_quietly() {
        let (url, _) = fake_api().await;
        let resolver = ProfileResolver::new(url, Some("t0ken".to_owned())).unwrap();

        assert!(matches!(resolver.fetch("nobody").await, Err(ProfileError::NotFound(_))));
        assert_eq!(resolver.lookup("nobody").await, Lookup::Failed);
    }

    #[tokio::test]
    async fn rejected_token_is_a_failed_lookup() {
        let (url, _) = fake_api().await;
        let resolver = ProfileResolver::new(url, None).unwrap();

        assert!(matches!(
            resolver.fetch("octocat").await,
            Err(ProfileError::Status(StatusCode::UNAUTHORIZED))
        ));
        assert_eq!(resolver.lookup("octocat").await, Lookup::Failed);
    }
}
