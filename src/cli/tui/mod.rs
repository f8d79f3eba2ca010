//! Interactive board for taskdeck
//!
//! Provides a terminal-based dashboard for browsing tasks, moving them
//! between states and editing blocker links, using ratatui.

mod app;
mod event;
mod ui;
mod utils;
mod views;

use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use anyhow::{anyhow, Result};

use super::Output;
use crate::api::ApiClient;
use app::App;
use event::EventHandler;

/// View mode for the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Tasks,
    Products,
}

impl FromStr for ViewMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tasks" | "t" | "1" => Ok(ViewMode::Tasks),
            "products" | "p" | "2" => Ok(ViewMode::Products),
            _ => Err(()),
        }
    }
}

/// Launch the board
pub fn run(client: ApiClient, output: &Output, view: &str) -> Result<()> {
    output.verbose_ctx("board", "Initializing board application");

    let view_mode = view.parse().unwrap_or_default();

    // Initialize terminal
    let mut terminal = ui::init_terminal()?;

    // The event handler comes first so the app can hand its sender to
    // background workers
    let event_handler = EventHandler::new(250);

    // Create app state; the initial fetch can fail, so restore the
    // terminal before surfacing the error
    let mut app = match App::new(client, event_handler.sender(), view_mode) {
        Ok(app) => app,
        Err(e) => {
            ui::restore_terminal()?;
            return Err(e);
        }
    };

    // Run the main loop with panic safety
    // This ensures terminal is restored even if the app panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        app.run(&mut terminal, event_handler)
    }));

    // Always restore terminal, even on panic
    let restore_result = ui::restore_terminal();

    // Handle the result
    match result {
        Ok(inner_result) => {
            restore_result?;
            inner_result
        }
        Err(panic_payload) => {
            // Try to restore terminal first
            let _ = restore_result;
            // Re-raise the panic with context
            if let Some(s) = panic_payload.downcast_ref::<&str>() {
                Err(anyhow!("board panicked: {}", s))
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                Err(anyhow!("board panicked: {}", s))
            } else {
                Err(anyhow!("board panicked with unknown error"))
            }
        }
    }
}
