//! taskdeck - A terminal dashboard for a remote task service
//!
//! taskdeck talks to a tasks/products HTTP API and presents it two ways:
//! classic subcommands for scripting, and an interactive board for working
//! through a backlog. Blocker links between tasks are validated locally
//! before any request is issued.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;

pub use domain::{Task, TaskCreate, TaskState, TaskUpdate};
