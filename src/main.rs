#![windows_subsystem = "windows"]
slint::include_modules!();

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use github_explorer::client::GitHubClient;
use github_explorer::explorer::{ExplorerSnapshot, Presenter};
use github_explorer::notify::Notification;
use github_explorer::repos::PanelView;
use github_explorer::{logging, Config, Explorer};
use slint::{Image, Rgba8Pixel, SharedPixelBuffer, VecModel};
use tracing::{info, warn};

const PANEL_LOADING: i32 = 0;
const PANEL_FAILED: i32 = 1;
const PANEL_LOADED: i32 = 2;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init_tracing(&config)?;
    info!(?config, "starting github-explorer");

    // Shared HTTP client, built once from the explicit configuration
    let client = Arc::new(GitHubClient::new(&config)?);

    // Background tokio runtime for async HTTP
    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;

    let app = AppWindow::new()?;
    let presenter = Arc::new(SlintPresenter {
        window: app.as_weak(),
        notification_timeout: config.notification_timeout,
    });
    let explorer = Rc::new(Explorer::new(
        client,
        presenter,
        rt.handle().clone(),
        config.avatars_enabled(),
    ));

    // =============================================
    //  CALLBACK: search-requested (button or Enter)
    // =============================================
    {
        let explorer = Rc::clone(&explorer);
        app.on_search_requested(move |query| {
            explorer.submit_search(query.as_str());
        });
    }

    // =============================================
    //  CALLBACK: account-toggled (expand/collapse row)
    // =============================================
    {
        let explorer = Rc::clone(&explorer);
        app.on_account_toggled(move |login| {
            explorer.toggle_account(login.as_str());
        });
    }

    // =============================================
    //  CALLBACK: toast-dismissed
    // =============================================
    {
        let explorer = Rc::clone(&explorer);
        let app_weak = app.as_weak();
        app.on_toast_dismissed(move || {
            if let Some(app) = app_weak.upgrade() {
                app.set_toast_visible(false);
            }
            explorer.dismiss_notification();
        });
    }

    // =============================================
    //  CALLBACK: repo-clicked
    // =============================================
    app.on_repo_clicked(|url| {
        if url.is_empty() {
            return;
        }
        if let Err(e) = open::that(url.as_str()) {
            warn!(%url, error = %e, "failed to open repository in browser");
        }
    });

    apply_snapshot(&app, explorer.snapshot());

    app.run()?;

    Ok(())
}

/// Marshals explorer updates onto the Slint event loop.
struct SlintPresenter {
    window: slint::Weak<AppWindow>,
    notification_timeout: Duration,
}

impl Presenter for SlintPresenter {
    fn render(&self, snapshot: ExplorerSnapshot) {
        let window = self.window.clone();
        let _ = slint::invoke_from_event_loop(move || {
            if let Some(app) = window.upgrade() {
                apply_snapshot(&app, snapshot);
            }
        });
    }

    fn notify(&self, notification: Notification) {
        let window = self.window.clone();
        let timeout = self.notification_timeout;
        let _ = slint::invoke_from_event_loop(move || {
            let Some(app) = window.upgrade() else {
                return;
            };
            let serial = app.get_toast_serial().wrapping_add(1);
            app.set_toast_serial(serial);
            app.set_toast_title(notification.title.into());
            app.set_toast_description(notification.description.into());
            app.set_toast_visible(true);

            // A newer toast bumps the serial, so this timer leaves it alone.
            let window = window.clone();
            slint::Timer::single_shot(timeout, move || {
                if let Some(app) = window.upgrade() {
                    if app.get_toast_serial() == serial {
                        app.set_toast_visible(false);
                    }
                }
            });
        });
    }
}

fn apply_snapshot(app: &AppWindow, snapshot: ExplorerSnapshot) {
    app.set_is_searching(snapshot.searching);
    app.set_error_message(snapshot.search_error.unwrap_or_default().into());

    let accounts: Vec<AccountItem> = snapshot
        .accounts
        .into_iter()
        .map(|row| {
            let avatar = match row.avatar {
                Some(avatar) => {
                    let buf = SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
                        &avatar.pixels,
                        avatar.width,
                        avatar.height,
                    );
                    Image::from_rgba8(buf)
                }
                None => Image::default(),
            };
            AccountItem {
                login: row.login.into(),
                avatar,
                expanded: row.expanded,
            }
        })
        .collect();
    app.set_account_list(Rc::new(VecModel::from(accounts)).into());

    let (state, error, repos) = match snapshot.panel.map(|panel| panel.view) {
        None | Some(PanelView::Loading) => (PANEL_LOADING, String::new(), Vec::new()),
        Some(PanelView::Failed(error)) => (PANEL_FAILED, error, Vec::new()),
        Some(PanelView::Loaded(rows)) => (PANEL_LOADED, String::new(), rows),
    };
    let repos: Vec<RepoItem> = repos
        .into_iter()
        .map(|row| RepoItem {
            name: row.name.into(),
            stars: i32::try_from(row.stars).unwrap_or(i32::MAX),
            description: row.description.into(),
            url: row.url.unwrap_or_default().into(),
        })
        .collect();
    app.set_panel_state(state);
    app.set_panel_error(error.into());
    app.set_repo_list(Rc::new(VecModel::from(repos)).into());
}
