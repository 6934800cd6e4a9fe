//! State of the repository panel shown under an expanded account.

use std::sync::{Arc, Weak};

use tracing::debug;

use crate::error::FetchError;
use crate::models::Repository;
use crate::notify::Notification;

pub const REPOS_FAILED: &str = "Failed to fetch repositories";
pub const NO_DESCRIPTION: &str = "No description yet.";

/// Identifies one repository fetch issued by a [`RepoPanel`].
///
/// The ticket is cancelled once the panel that issued it is dropped or
/// switched to another login.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    login: String,
    generation: u64,
    mount: Weak<()>,
}

impl LoadTicket {
    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn is_cancelled(&self) -> bool {
        self.mount.strong_count() == 0
    }
}

/// One rendered repository row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRow {
    pub name: String,
    pub stars: u64,
    pub description: String,
    pub url: Option<String>,
}

impl From<&Repository> for RepoRow {
    fn from(repo: &Repository) -> Self {
        let description = match repo.description.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => NO_DESCRIPTION.to_string(),
        };
        Self {
            name: repo.name.clone(),
            stars: repo.stargazers_count,
            description,
            url: repo.html_url.clone(),
        }
    }
}

/// What the panel shows: only one of these at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView {
    Loading,
    Failed(String),
    Loaded(Vec<RepoRow>),
}

#[derive(Debug)]
pub struct RepoPanel {
    login: String,
    repos: Vec<Repository>,
    in_flight: bool,
    error: Option<String>,
    generation: u64,
    mount: Arc<()>,
}

impl RepoPanel {
    /// Mounts a panel for `login` and starts its first load.
    pub fn mount(login: impl Into<String>) -> (Self, LoadTicket) {
        let mut panel = Self {
            login: login.into(),
            repos: Vec::new(),
            in_flight: false,
            error: None,
            generation: 0,
            mount: Arc::new(()),
        };
        let ticket = panel.begin_load();
        (panel, ticket)
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn repos(&self) -> &[Repository] {
        &self.repos
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Points the panel at another account.
    ///
    /// A different login is a fresh entity: earlier results, errors and
    /// outstanding tickets are dropped and a new load starts. The same login
    /// is a no-op.
    pub fn set_login(&mut self, login: &str) -> Option<LoadTicket> {
        if self.login == login {
            return None;
        }
        self.login = login.to_string();
        self.repos.clear();
        self.mount = Arc::new(());
        Some(self.begin_load())
    }

    fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.in_flight = true;
        self.error = None;
        LoadTicket {
            login: self.login.clone(),
            generation: self.generation,
            mount: Arc::downgrade(&self.mount),
        }
    }

    /// Applies a fetch result; results for stale tickets are discarded.
    pub fn finish(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<Repository>, FetchError>,
    ) -> Option<Notification> {
        if ticket.is_cancelled() || ticket.generation != self.generation || ticket.login != self.login
        {
            debug!(login = %ticket.login, "discarding stale repository response");
            return None;
        }
        self.in_flight = false;
        match result {
            Ok(repos) => {
                self.repos = repos;
                None
            }
            Err(_) => {
                self.error = Some(REPOS_FAILED.to_string());
                Some(Notification::fetch(REPOS_FAILED))
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn view(&self) -> PanelView {
        if self.in_flight {
            PanelView::Loading
        } else if let Some(error) = &self.error {
            PanelView::Failed(error.clone())
        } else {
            PanelView::Loaded(self.repos.iter().map(RepoRow::from).collect())
        }
    }
}
