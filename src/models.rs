use serde::Deserialize;

/// A single user item from the search results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Response from the GitHub Search Users API (`/search/users`).
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<Account>,
}

/// A public repository from the `/users/{login}/repos` API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}
