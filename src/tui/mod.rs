pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::ThemeColors;

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};
use tokio::task::JoinHandle;

use crate::dashboard::{Action, Command};
use crate::fetch::{fetch_pull_requests, FetchOptions};
use crate::github::{FetchError, GitHubClient, RepoId};

/// Everything a background fetch needs
#[derive(Clone)]
pub struct FetchContext {
    pub client: GitHubClient,
    pub options: FetchOptions,
    /// Upper bound on one whole fetch, all pages included
    pub timeout: Duration,
}

struct PendingFetch {
    generation: u64,
    handle: JoinHandle<Action>,
}

pub async fn run_tui(mut app: App, initial: Command, ctx: FetchContext) -> anyhow::Result<()> {
    // Hold log output while the TUI owns the terminal
    crate::logger::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(250);

    let mut pending_fetch: Option<PendingFetch> = None;
    execute(initial, &ctx, &mut pending_fetch);

    // Main loop
    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        for command in app.take_commands() {
            execute(command, &ctx, &mut pending_fetch);
        }

        // Check if background fetch has completed
        if pending_fetch
            .as_ref()
            .is_some_and(|pending| pending.handle.is_finished())
        {
            if let Some(PendingFetch { generation, handle }) = pending_fetch.take() {
                let action = match handle.await {
                    Ok(action) => action,
                    Err(e) => Action::FetchFailed {
                        generation,
                        error: FetchError::Network(format!("fetch task failed: {}", e)),
                    },
                };
                app.dispatch(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    if let Some(pending) = pending_fetch.take() {
        pending.handle.abort();
    }

    // Restore terminal
    ratatui::restore();

    for msg in crate::logger::drain() {
        eprintln!("{}", msg);
    }

    Ok(())
}

/// Start the work a command asks for. A new fetch supersedes the one in
/// flight; its result would be dropped as stale anyway.
fn execute(command: Command, ctx: &FetchContext, pending_fetch: &mut Option<PendingFetch>) {
    match command {
        Command::Fetch {
            generation,
            repository,
        } => {
            if let Some(previous) = pending_fetch.take() {
                log::debug!("Aborting fetch generation {}", previous.generation);
                previous.handle.abort();
            }
            let ctx = ctx.clone();
            let handle = tokio::spawn(async move { fetch_action(&ctx, generation, repository).await });
            *pending_fetch = Some(PendingFetch { generation, handle });
        }
    }
}

/// Fetch `repository` and report the outcome as the action that commits it
pub async fn fetch_action(ctx: &FetchContext, generation: u64, repository: String) -> Action {
    let result = match RepoId::parse(&repository) {
        Ok(repo) => {
            match tokio::time::timeout(
                ctx.timeout,
                fetch_pull_requests(&ctx.client, &repo, &ctx.options),
            )
            .await
            {
                Ok(result) => result,
                Err(_elapsed) => Err(FetchError::Network(format!(
                    "timed out after {}",
                    humantime::format_duration(ctx.timeout)
                ))),
            }
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(records) => Action::FetchSucceeded {
            generation,
            repository,
            records,
        },
        Err(error) => {
            log::warn!("Fetching {} failed: {}", repository, error);
            Action::FetchFailed { generation, error }
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }

                // Row navigation
                KeyCode::Char('j') | KeyCode::Down => app.next_row(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

                // Page navigation
                KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                    app.dispatch(Action::NextPage)
                }
                KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                    app.dispatch(Action::PrevPage)
                }

                // Filters
                KeyCode::Char('s') => app.dispatch(Action::CycleStatus),
                KeyCode::Char('a') => app.dispatch(Action::ToggleAtRisk),
                KeyCode::Char('[') => app.start_input(app::InputMode::EditOpenedAfter),
                KeyCode::Char(']') => app.start_input(app::InputMode::EditOpenedBefore),
                KeyCode::Char('c') => app.dispatch(Action::ClearDates),
                KeyCode::Char('/') => app.start_input(app::InputMode::EditRepository),

                KeyCode::Char('r') => {
                    app.dispatch(Action::Refresh);
                    app.show_flash("Refreshing...".to_string());
                }

                // Open PR in browser
                KeyCode::Enter | KeyCode::Char('o') => app.open_selected(),

                KeyCode::Char('?') => app.show_help(),

                _ => {}
            }
        }
        app::InputMode::EditRepository
        | app::InputMode::EditOpenedAfter
        | app::InputMode::EditOpenedBefore => match key.code {
            KeyCode::Enter => app.confirm_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => app.input.push(c),
            // Ignore all other keys (don't propagate to Normal mode)
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardSettings, DashboardState};
    use crate::filter::{FilterSpec, StatusFilter};
    use crate::github::create_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let (state, _) = DashboardState::start(DashboardSettings::default(), FilterSpec::default());
        App::new(state)
    }

    fn context(base_url: &str) -> FetchContext {
        FetchContext {
            client: create_client(base_url, Duration::from_secs(5), false).unwrap(),
            options: FetchOptions::default(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_filter_keys() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.dashboard.filters.status, StatusFilter::Open);
        handle_key_event(&mut app, key(KeyCode::Char('a')));
        assert!(app.dashboard.filters.at_risk);
    }

    #[test]
    fn test_typing_into_repository_input() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        for c in "a/bq".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_key_event(&mut app, key(KeyCode::Backspace));
        // 'q' was typed, not treated as quit
        assert!(!app.should_quit);
        assert_eq!(app.input, "a/b");

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.dashboard.filters.repository, "a/b");
        assert_eq!(app.take_commands().len(), 1);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.input_mode, app::InputMode::Help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.input_mode, app::InputMode::Normal);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_fetch_action_success() {
        let server = MockServer::start().await;
        let body = serde_json::json!([{
            "number": 1,
            "title": "Add feature",
            "user": { "login": "octocat" },
            "state": "open",
            "html_url": "https://github.com/owner/repo/pull/1",
            "created_at": "2024-06-01T00:00:00Z",
            "closed_at": null
        }]);
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/pulls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let action = fetch_action(&context(&server.uri()), 7, "owner/repo".to_string()).await;
        match action {
            Action::FetchSucceeded {
                generation,
                repository,
                records,
            } => {
                assert_eq!(generation, 7);
                assert_eq!(repository, "owner/repo");
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].author, "octocat");
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_action_invalid_repository() {
        let server = MockServer::start().await;
        let action = fetch_action(&context(&server.uri()), 3, "not a repo".to_string()).await;
        match action {
            Action::FetchFailed { generation, error } => {
                assert_eq!(generation, 3);
                assert!(matches!(error, FetchError::InvalidRepository(_)));
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_action_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut ctx = context(&server.uri());
        ctx.timeout = Duration::from_millis(100);
        let action = fetch_action(&ctx, 1, "owner/repo".to_string()).await;
        match action {
            Action::FetchFailed { error, .. } => {
                assert_eq!(error, FetchError::Network("timed out after 100ms".to_string()));
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }
}
