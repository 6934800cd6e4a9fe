//! State of the user search view.
//!
//! The view owns the query text, the accounts returned by the last successful
//! search, which account (at most one) is expanded, and the progress of the
//! current request. It never performs I/O itself: [`SearchView::submit`] says
//! whether a request should be issued and [`SearchView::finish`] applies its
//! outcome.

use tracing::debug;

use crate::error::FetchError;
use crate::models::Account;
use crate::notify::Notification;

pub const EMPTY_QUERY: &str = "Please enter a username";
pub const SEARCH_FAILED: &str = "Failed to fetch users";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    Succeeded,
    Failed,
}

/// Outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submit {
    /// Issue exactly one search for this query.
    Started(String),
    /// Nothing to search for; show the notification instead.
    Rejected(Notification),
    /// A search is already in flight.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Expanded,
    Collapsed,
    /// The login is not part of the current results.
    Unknown,
}

#[derive(Debug, Default)]
pub struct SearchView {
    query: String,
    accounts: Vec<Account>,
    expanded: Option<String>,
    phase: SearchPhase,
    error: Option<String>,
}

impl SearchView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn in_flight(&self) -> bool {
        self.phase == SearchPhase::Searching
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validates the query and, if a search may start, moves to `Searching`.
    ///
    /// An empty query leaves loading and result state untouched; any other
    /// query, whitespace included, is searched exactly as typed.
    pub fn submit(&mut self) -> Submit {
        if self.query.is_empty() {
            return Submit::Rejected(Notification::validation(EMPTY_QUERY));
        }
        if self.in_flight() {
            return Submit::Busy;
        }
        self.phase = SearchPhase::Searching;
        self.error = None;
        Submit::Started(self.query.clone())
    }

    /// Applies the response of the search started by the last [`submit`](Self::submit).
    ///
    /// On failure the previous accounts are kept and a notification is returned.
    pub fn finish(&mut self, result: Result<Vec<Account>, FetchError>) -> Option<Notification> {
        if !self.in_flight() {
            debug!(phase = ?self.phase, "ignoring search result with no search in flight");
            return None;
        }
        match result {
            Ok(accounts) => {
                self.accounts = accounts;
                self.phase = SearchPhase::Succeeded;
                let still_listed = self
                    .expanded
                    .as_deref()
                    .is_some_and(|login| self.accounts.iter().any(|a| a.login == login));
                if !still_listed {
                    self.expanded = None;
                }
                None
            }
            Err(err) => {
                self.phase = SearchPhase::Failed;
                self.error = Some(err.kind().search_message().to_string());
                Some(Notification::fetch(SEARCH_FAILED))
            }
        }
    }

    /// Expands `login`, or collapses it if it is already the expanded row.
    pub fn toggle(&mut self, login: &str) -> Toggle {
        if !self.accounts.iter().any(|a| a.login == login) {
            return Toggle::Unknown;
        }
        if self.expanded.as_deref() == Some(login) {
            self.expanded = None;
            Toggle::Collapsed
        } else {
            self.expanded = Some(login.to_string());
            Toggle::Expanded
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationKind;
    use reqwest::StatusCode;

    fn account(id: u64, login: &str) -> Account {
        Account {
            id,
            login: login.to_string(),
            avatar_url: format!("https://avatars.example/{id}"),
        }
    }

    fn failure(code: u16) -> FetchError {
        FetchError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        }
    }

    fn searched(accounts: Vec<Account>) -> SearchView {
        let mut view = SearchView::new();
        view.set_query("octo");
        assert!(matches!(view.submit(), Submit::Started(_)));
        view.finish(Ok(accounts));
        view
    }

    #[test]
    fn empty_query_is_rejected_without_touching_state() {
        let mut view = SearchView::new();
        match view.submit() {
            Submit::Rejected(n) => {
                assert_eq!(n.kind, NotificationKind::Validation);
                assert_eq!(n.description, "Please enter a username");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(view.phase(), SearchPhase::Idle);
    }

    #[test]
    fn whitespace_query_is_searched_as_typed() {
        let mut view = SearchView::new();
        view.set_query("   ");
        assert_eq!(view.submit(), Submit::Started("   ".to_string()));
        assert!(view.in_flight());
    }

    #[test]
    fn query_is_passed_through_unmodified() {
        let mut view = SearchView::new();
        view.set_query(" octo cat ");
        assert_eq!(view.submit(), Submit::Started(" octo cat ".to_string()));
        assert_eq!(view.phase(), SearchPhase::Searching);
    }

    #[test]
    fn second_submit_while_searching_is_busy() {
        let mut view = SearchView::new();
        view.set_query("octo");
        assert!(matches!(view.submit(), Submit::Started(_)));
        assert_eq!(view.submit(), Submit::Busy);
    }

    #[test]
    fn success_replaces_results_in_server_order() {
        let mut view = searched(vec![account(1, "old")]);
        view.set_query("new");
        view.submit();
        let notification = view.finish(Ok(vec![account(3, "c"), account(1, "a"), account(2, "b")]));

        assert_eq!(notification, None);
        assert_eq!(view.phase(), SearchPhase::Succeeded);
        let logins: Vec<_> = view.accounts().iter().map(|a| a.login.as_str()).collect();
        assert_eq!(logins, ["c", "a", "b"]);
    }

    #[test]
    fn failure_keeps_previous_results_and_reports() {
        let mut view = searched(vec![account(1, "octocat")]);
        view.submit();
        let notification = view.finish(Err(failure(500))).unwrap();

        assert_eq!(notification.kind, NotificationKind::Fetch);
        assert_eq!(notification.description, "Failed to fetch users");
        assert_eq!(view.phase(), SearchPhase::Failed);
        assert_eq!(
            view.error(),
            Some("Failed to fetch users. Please check your network or Github token.")
        );
        assert_eq!(view.accounts().len(), 1);
    }

    #[test]
    fn rate_limit_has_its_own_message() {
        let mut view = SearchView::new();
        view.set_query("octo");
        view.submit();
        view.finish(Err(failure(403)));
        assert_eq!(view.error(), Some("Rate limit exceeded. Please try again later."));
    }

    #[test]
    fn new_submit_clears_previous_error() {
        let mut view = SearchView::new();
        view.set_query("octo");
        view.submit();
        view.finish(Err(failure(500)));
        assert!(view.error().is_some());

        view.submit();
        assert_eq!(view.error(), None);
        view.finish(Ok(vec![]));
        assert_eq!(view.phase(), SearchPhase::Succeeded);
    }

    #[test]
    fn only_one_row_is_expanded() {
        let mut view = searched(vec![account(1, "a"), account(2, "b")]);

        assert_eq!(view.toggle("a"), Toggle::Expanded);
        assert_eq!(view.expanded(), Some("a"));
        assert_eq!(view.toggle("b"), Toggle::Expanded);
        assert_eq!(view.expanded(), Some("b"));
        assert_eq!(view.toggle("b"), Toggle::Collapsed);
        assert_eq!(view.expanded(), None);
        assert_eq!(view.toggle("ghost"), Toggle::Unknown);
    }

    #[test]
    fn new_results_collapse_a_row_that_disappeared() {
        let mut view = searched(vec![account(1, "a"), account(2, "b")]);
        view.toggle("a");

        view.submit();
        view.finish(Ok(vec![account(1, "a")]));
        assert_eq!(view.expanded(), Some("a"));

        view.submit();
        view.finish(Ok(vec![account(2, "b")]));
        assert_eq!(view.expanded(), None);
    }

    #[test]
    fn stray_result_without_search_is_ignored() {
        let mut view = SearchView::new();
        assert_eq!(view.finish(Err(failure(500))), None);
        assert_eq!(view.phase(), SearchPhase::Idle);
        assert_eq!(view.error(), None);
    }
}
