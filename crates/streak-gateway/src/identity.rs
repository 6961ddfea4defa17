//! Identity bootstrap
//!
//! Validates the token once at startup by fetching the current user.

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use streak_common::{AppError, AppResult};

/// The account behind the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.username, self.id)
    }
}

/// GET `{api_url}/users/@me` with the raw token
///
/// Any status other than 200 means the token was rejected.
pub async fn fetch_identity(client: &reqwest::Client, api_url: &str, token: &str) -> AppResult<User> {
    let url = format!("{}/users/@me", api_url.trim_end_matches('/'));

    let response = client
        .get(&url)
        .header(AUTHORIZATION, token)
        .send()
        .await
        .map_err(|e| AppError::external(format!("identity request failed: {e}")))?;

    let status = response.status();
    if status != StatusCode::OK {
        tracing::warn!(status = %status, "Token rejected");
        return Err(AppError::InvalidCredentials);
    }

    response
        .json::<User>()
        .await
        .map_err(|e| AppError::external(format!("invalid identity response: {e}")))
}
