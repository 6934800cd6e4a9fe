use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::avatar::{self, Avatar};
use crate::config::Config;
use crate::error::FetchError;
use crate::models::{Account, Repository, SearchResponse};

/// The slice of the GitHub REST API the explorer talks to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET /search/users?q={query}`; matching semantics belong to GitHub.
    async fn search_users(&self, query: &str) -> Result<Vec<Account>, FetchError>;

    /// `GET /users/{login}/repos`, first page only.
    async fn fetch_user_repos(&self, login: &str) -> Result<Vec<Repository>, FetchError>;

    async fn fetch_avatar(&self, _url: &str) -> Option<Avatar> {
        None
    }
}

/// reqwest-backed [`GitHubApi`] sharing one connection pool.
pub struct GitHubClient {
    http: Client,
    api_url: String,
    avatar_size: u32,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: build_client(config.token.as_deref())?,
            api_url: config.api_url.clone(),
            avatar_size: config.avatar_size,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.http.get(url).send().await.map_err(|e| {
            warn!(%url, error = %e, "request failed");
            FetchError::Transport(e)
        })?;

        let status = response.status();
        let body = response.text().await?;
        trace!(%url, %status, %body, "raw response");

        if !status.is_success() {
            warn!(%url, %status, "GitHub API returned an error");
            return Err(FetchError::Status { status, body });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(%url, error = %e, "failed to deserialize response");
            FetchError::Decode(e)
        })
    }
}

/// Creates an HTTP client with the headers every request needs.
fn build_client(token: Option<&str>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("github-explorer"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github.v3+json"),
    );

    if let Some(token) = token {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {token}")).context("Invalid token value")?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Client::builder()
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn search_users(&self, query: &str) -> Result<Vec<Account>, FetchError> {
        let url = format!(
            "{}/search/users?q={}",
            self.api_url,
            urlencoding::encode(query)
        );
        let search: SearchResponse = self.get_json(&url).await?;
        debug!(%query, count = search.items.len(), "user search finished");
        Ok(search.items)
    }

    async fn fetch_user_repos(&self, login: &str) -> Result<Vec<Repository>, FetchError> {
        let url = format!(
            "{}/users/{}/repos",
            self.api_url,
            urlencoding::encode(login)
        );
        let repos: Vec<Repository> = self.get_json(&url).await?;
        debug!(%login, count = repos.len(), "repository fetch finished");
        Ok(repos)
    }

    async fn fetch_avatar(&self, url: &str) -> Option<Avatar> {
        if self.avatar_size == 0 || url.is_empty() {
            return None;
        }
        let sized = avatar::sized_url(url, self.avatar_size);
        let bytes = match self.http.get(&sized).send().await {
            Ok(response) if response.status().is_success() => response.bytes().await.ok()?,
            Ok(response) => {
                debug!(url = %sized, status = %response.status(), "avatar unavailable");
                return None;
            }
            Err(e) => {
                debug!(url = %sized, error = %e, "avatar download failed");
                return None;
            }
        };
        avatar::decode(&bytes, self.avatar_size)
    }
}
