//! Main application state and UI loop
//!
//! Contains the App struct and main UI event handling logic

use crate::api::Backend;
use crate::consts::cli_consts::{OUTCOME_QUEUE_SIZE, ui};
use crate::engine::{SyncOutcome, SyncRequest, ViewSyncEngine};
use crate::ui::dashboard::{DashboardState, Reaction, render_dashboard};
use crossterm::event::{self, Event};
use ratatui::{Frame, Terminal, backend::Backend as TerminalBackend};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// UI configuration data grouped by concern
#[derive(Debug, Clone)]
pub struct UIConfig {
    pub with_background_color: bool,
    /// Directory spreadsheet exports are written to.
    pub export_dir: PathBuf,
}

impl UIConfig {
    pub fn new(with_background_color: bool, export_dir: PathBuf) -> Self {
        Self {
            with_background_color,
            export_dir,
        }
    }
}

/// How the UI loop ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitReason {
    Quit,
    LoggedOut,
}

/// Application state
pub struct App {
    state: DashboardState,

    /// Shared with the tasks executing requests.
    backend: Arc<dyn Backend>,

    /// Carries finished requests back to the UI task.
    outcome_sender: mpsc::Sender<SyncOutcome>,
    outcome_receiver: mpsc::Receiver<SyncOutcome>,
}

impl App {
    /// Creates a new instance of the application.
    pub fn new(backend: Arc<dyn Backend>, engine: ViewSyncEngine, ui_config: UIConfig) -> Self {
        let (outcome_sender, outcome_receiver) = mpsc::channel(OUTCOME_QUEUE_SIZE);
        let environment = backend.environment().clone();
        Self {
            state: DashboardState::new(engine, environment, Instant::now(), ui_config),
            backend,
            outcome_sender,
            outcome_receiver,
        }
    }

    /// Runs `request` on its own task; the outcome comes back over the channel.
    fn dispatch(&self, request: SyncRequest) {
        let backend = Arc::clone(&self.backend);
        let sender = self.outcome_sender.clone();
        tokio::spawn(async move {
            let outcome = request.execute(backend.as_ref()).await;
            if sender.send(outcome).await.is_err() {
                log::debug!("UI closed before the outcome arrived");
            }
        });
    }

    fn dispatch_all(&self, requests: Vec<SyncRequest>) {
        for request in requests {
            self.dispatch(request);
        }
    }

    /// Applies every finished request. Engine state only changes here, on the UI task.
    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_receiver.try_recv() {
            if matches!(outcome, SyncOutcome::LoggedOut(_)) {
                self.state.logged_out = true;
            }
            let follow_ups = self.state.engine.apply(outcome);
            self.dispatch_all(follow_ups);
        }
    }
}

/// Runs the application UI in a loop, handling events and rendering the dashboard.
pub async fn run<B: TerminalBackend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> std::io::Result<ExitReason> {
    let initial = app.state.initial_requests();
    app.dispatch_all(initial);

    // UI event loop
    loop {
        app.drain_outcomes();
        if app.state.logged_out {
            return Ok(ExitReason::LoggedOut);
        }

        app.state.update(Instant::now());
        terminal.draw(|f| render(f, &app.state))?;

        // Poll for key events
        if event::poll(ui::poll_interval())? {
            if let Event::Key(key) = event::read()? {
                // Skip events that are not KeyEventKind::Press
                if key.kind == event::KeyEventKind::Release {
                    continue;
                }

                let Reaction { requests, quit } = app.state.handle_key(key);
                app.dispatch_all(requests);
                if quit {
                    return Ok(ExitReason::Quit);
                }
            }
        }

        // Let spawned requests make progress between frames
        tokio::task::yield_now().await;
    }
}

/// Renders the current screen based on the application state.
fn render(f: &mut Frame, state: &DashboardState) {
    render_dashboard(f, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::environment::Environment;
    use crate::models::RecordSnapshot;

    #[tokio::test]
    async fn outcomes_are_applied_on_the_ui_task() {
        let mut backend = MockBackend::new();
        backend.expect_environment().return_const(Environment::Local);
        backend.expect_dashboard().times(1).returning(|| {
            Ok(RecordSnapshot {
                today_count: 5,
                ..Default::default()
            })
        });

        let mut app = App::new(
            Arc::new(backend),
            ViewSyncEngine::new(),
            UIConfig::new(false, std::env::temp_dir()),
        );
        let request = app.state.engine.refresh_dashboard();
        app.dispatch(request);

        let outcome = app.outcome_receiver.recv().await.unwrap();
        let follow_ups = app.state.engine.apply(outcome);
        assert!(follow_ups.is_empty());
        assert_eq!(app.state.engine.snapshot().today_count, 5);
    }
}
