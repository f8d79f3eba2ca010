//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Task | Remote task management | `task list`, `task create`, `task state` |
//! | Dependencies | Blocker links between tasks | `task block`, `task unblock`, `task deps` |
//! | Product | Catalog browsing | `product list`, `product categories` |
//! | Config | Service settings | `config show`, `config set-url` |
//! | Board | Interactive dashboard | `board`, `board --view products` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! td --verbose task list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod config_cmd;
mod product;
mod task;
mod tui;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
