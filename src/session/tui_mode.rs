//! TUI mode execution

use super::{
    SessionData,
    messages::{print_session_exit_success, print_session_logged_out, print_session_starting},
};
use crate::config::Config;
use crate::engine::ViewSyncEngine;
use crate::ui::{self, ExitReason, UIConfig};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{error::Error, io};

/// Runs the application in TUI mode
///
/// This function handles:
/// 1. Terminal setup and cleanup
/// 2. UI application initialization and execution
/// 3. Clearing the local configuration when the user logged out
pub async fn run_tui_mode(
    session: SessionData,
    with_background: bool,
) -> Result<(), Box<dyn Error>> {
    print_session_starting(session.backend.environment());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Initialize the terminal with Crossterm backend
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let ui_config = UIConfig::new(with_background, session.export_dir.clone());
    let app = ui::App::new(session.backend.clone(), ViewSyncEngine::new(), ui_config);

    let result = ui::run(&mut terminal, app).await;

    // Clean up the terminal after running the application
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if result? == ExitReason::LoggedOut {
        Config::clear(&session.config_path)?;
        print_session_logged_out();
    }
    print_session_exit_success();

    Ok(())
}
