//! Domain models for taskdeck
//!
//! Contains the wire types and local checks without any I/O concerns.

mod blocker;
mod graph;
mod product;
mod task;

pub use blocker::{check_add_blocker, check_remove_blocker, parse_blocker_id, BlockerRejection};
pub use graph::{audit_edges, BlockerGraph, EdgeMismatch};
pub use product::{categories, demo_catalog, Product};
pub use task::{
    clean_description, clean_title, ParseTaskStateError, Task, TaskCreate, TaskState, TaskUpdate,
};
