//! Wires the search view and the repository panel to the GitHub API.
//!
//! [`Explorer`] is driven from the UI thread. Every request runs as a task on
//! a tokio runtime and reports back through a [`Presenter`]. A task keeps only
//! a weak handle to the explorer, and every repository fetch carries a
//! [`LoadTicket`]. Responses that arrive after the explorer or the panel went
//! away are dropped instead of being applied.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::avatar::Avatar;
use crate::client::GitHubApi;
use crate::notify::Notification;
use crate::repos::{LoadTicket, PanelView, RepoPanel};
use crate::search::{SearchView, Submit, Toggle};

/// Receives everything the UI needs to draw.
///
/// Calls may come from runtime worker threads.
pub trait Presenter: Send + Sync {
    fn render(&self, snapshot: ExplorerSnapshot);
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRow {
    pub login: String,
    pub avatar: Option<Arc<Avatar>>,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub login: String,
    pub view: PanelView,
}

/// Immutable copy of the explorer state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerSnapshot {
    pub searching: bool,
    pub search_error: Option<String>,
    pub accounts: Vec<AccountRow>,
    pub panel: Option<PanelSnapshot>,
}

#[derive(Default)]
struct ExplorerState {
    search: SearchView,
    panel: Option<RepoPanel>,
    avatars: HashMap<String, Arc<Avatar>>,
}

impl ExplorerState {
    fn snapshot(&self) -> ExplorerSnapshot {
        let expanded = self.search.expanded();
        ExplorerSnapshot {
            searching: self.search.in_flight(),
            search_error: self.search.error().map(str::to_string),
            accounts: self
                .search
                .accounts()
                .iter()
                .map(|account| AccountRow {
                    login: account.login.clone(),
                    avatar: self.avatars.get(&account.login).cloned(),
                    expanded: expanded == Some(account.login.as_str()),
                })
                .collect(),
            panel: self.panel.as_ref().map(|panel| PanelSnapshot {
                login: panel.login().to_string(),
                view: panel.view(),
            }),
        }
    }
}

struct Inner {
    api: Arc<dyn GitHubApi>,
    presenter: Arc<dyn Presenter>,
    runtime: Handle,
    load_avatars: bool,
    state: Mutex<ExplorerState>,
}

pub struct Explorer {
    inner: Arc<Inner>,
}

impl Explorer {
    /// With `load_avatars`, account avatars are downloaded after each
    /// successful search.
    pub fn new(
        api: Arc<dyn GitHubApi>,
        presenter: Arc<dyn Presenter>,
        runtime: Handle,
        load_avatars: bool,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                presenter,
                runtime,
                load_avatars,
                state: Mutex::new(ExplorerState::default()),
            }),
        }
    }

    pub fn snapshot(&self) -> ExplorerSnapshot {
        self.inner.lock().snapshot()
    }

    /// Searches for `query`, returning the request task if one was started.
    pub fn submit_search(&self, query: &str) -> Option<JoinHandle<()>> {
        let outcome = {
            let mut state = self.inner.lock();
            state.search.set_query(query);
            state.search.submit()
        };
        match outcome {
            Submit::Rejected(notification) => {
                self.inner.presenter.notify(notification);
                None
            }
            Submit::Busy => {
                debug!(%query, "search already in flight, ignoring submission");
                None
            }
            Submit::Started(query) => {
                info!(%query, "searching users");
                self.inner.render();
                Some(Inner::spawn_search(&self.inner, query))
            }
        }
    }

    /// Expands or collapses the row for `login`, returning the repository
    /// fetch task if expanding started one.
    pub fn toggle_account(&self, login: &str) -> Option<JoinHandle<()>> {
        let ticket = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            match state.search.toggle(login) {
                Toggle::Expanded => match state.panel.as_mut() {
                    Some(panel) => panel.set_login(login),
                    None => {
                        let (panel, ticket) = RepoPanel::mount(login);
                        state.panel = Some(panel);
                        Some(ticket)
                    }
                },
                Toggle::Collapsed => {
                    state.panel = None;
                    None
                }
                Toggle::Unknown => {
                    debug!(%login, "toggle for an account that is not listed");
                    return None;
                }
            }
        };
        self.inner.render();
        ticket.map(|ticket| Inner::spawn_repo_load(&self.inner, ticket))
    }

    /// Clears the error text of both views.
    pub fn dismiss_notification(&self) {
        {
            let mut state = self.inner.lock();
            state.search.dismiss_error();
            if let Some(panel) = state.panel.as_mut() {
                panel.dismiss_error();
            }
        }
        self.inner.render();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, ExplorerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes the current state. The lock is held until the presenter
    /// returns so snapshots reach it in the order they were taken.
    fn render(&self) {
        let state = self.lock();
        self.presenter.render(state.snapshot());
    }

    fn spawn_search(this: &Arc<Self>, query: String) -> JoinHandle<()> {
        let api = Arc::clone(&this.api);
        let weak = Arc::downgrade(this);
        this.runtime.spawn(async move {
            let result = api.search_users(&query).await;
            let Some(inner) = weak.upgrade() else {
                debug!(%query, "explorer closed, discarding search response");
                return;
            };

            let (notification, avatar_urls) = {
                let mut guard = inner.lock();
                let state = &mut *guard;
                let succeeded = result.is_ok();
                let notification = state.search.finish(result);
                if succeeded {
                    state.avatars.clear();
                    if state.search.expanded().is_none() {
                        state.panel = None;
                    }
                }
                let urls: Vec<(String, String)> = if succeeded && inner.load_avatars {
                    state
                        .search
                        .accounts()
                        .iter()
                        .map(|a| (a.login.clone(), a.avatar_url.clone()))
                        .collect()
                } else {
                    Vec::new()
                };
                (notification, urls)
            };

            inner.render();
            if let Some(notification) = notification {
                inner.presenter.notify(notification);
            }
            for (login, url) in avatar_urls {
                Inner::spawn_avatar_load(&inner, login, url);
            }
        })
    }

    fn spawn_repo_load(this: &Arc<Self>, ticket: LoadTicket) -> JoinHandle<()> {
        let api = Arc::clone(&this.api);
        let weak = Arc::downgrade(this);
        info!(login = %ticket.login(), "fetching repositories");
        this.runtime.spawn(async move {
            let result = api.fetch_user_repos(ticket.login()).await;
            if ticket.is_cancelled() {
                debug!(login = %ticket.login(), "panel unmounted, discarding repositories");
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };

            let notification = match inner.lock().panel.as_mut() {
                Some(panel) => panel.finish(&ticket, result),
                None => None,
            };
            inner.render();
            if let Some(notification) = notification {
                inner.presenter.notify(notification);
            }
        })
    }

    fn spawn_avatar_load(this: &Arc<Self>, login: String, url: String) {
        let api = Arc::clone(&this.api);
        let weak = Arc::downgrade(this);
        this.runtime.spawn(async move {
            let Some(avatar) = api.fetch_avatar(&url).await else {
                return;
            };
            let Some(inner) = weak.upgrade() else {
                return;
            };
            {
                let mut state = inner.lock();
                let listed = state
                    .search
                    .accounts()
                    .iter()
                    .any(|a| a.login == login && a.avatar_url == url);
                if !listed {
                    return;
                }
                state.avatars.insert(login, Arc::new(avatar));
            }
            inner.render();
        });
    }
}
