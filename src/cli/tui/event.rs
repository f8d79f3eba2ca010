//! Event handling for the board

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

use crate::domain::Task;

/// What a background service call was doing, so its outcome can be
/// routed back to the right piece of pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// A mutation against one task row
    Task(i64),
    /// Creating a new task
    Create,
    /// Re-fetching the task list
    Refresh,
}

/// Outcome of a background service call, delivered to the UI loop
#[derive(Debug)]
pub struct OpOutcome {
    pub kind: OpKind,
    /// Status line to show when the call succeeds
    pub note: String,
    /// Fresh task list on success, service error text on failure
    pub result: Result<Vec<Task>, String>,
}

/// Terminal and worker events
#[derive(Debug)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal resize event (width, height - currently unused but kept for future)
    #[allow(dead_code)]
    Resize(u16, u16),
    /// Tick event for periodic updates
    Tick,
    /// A background service call finished
    Op(OpOutcome),
}

/// Handles terminal events in a separate thread
pub struct EventHandler {
    /// Event receiver
    rx: mpsc::Receiver<Event>,
    /// Event sender, cloned into worker threads so they can report back
    tx: mpsc::Sender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate in milliseconds
    pub fn new(tick_rate_ms: u64) -> Self {
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let (tx, rx) = mpsc::channel();
        let tx_clone = tx.clone();

        thread::spawn(move || {
            loop {
                // Poll for events with timeout
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        match evt {
                            CrosstermEvent::Key(key) => {
                                // Only send key press events, not release
                                if key.kind == KeyEventKind::Press
                                    && tx_clone.send(Event::Key(key)).is_err()
                                {
                                    break;
                                }
                            }
                            CrosstermEvent::Resize(w, h) => {
                                if tx_clone.send(Event::Resize(w, h)).is_err() {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                } else {
                    // Send tick event
                    if tx_clone.send(Event::Tick).is_err() {
                        break;
                    }
                }
            }
        });

        Self { rx, tx }
    }

    /// A sender handle for worker threads
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    /// Receive the next event (blocking)
    pub fn next(&self) -> Result<Event> {
        Ok(self.rx.recv()?)
    }
}
