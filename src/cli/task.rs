//! Task CLI commands

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Subcommand;

use super::output::Output;
use crate::api::ApiClient;
use crate::domain::{
    audit_edges, check_add_blocker, check_remove_blocker, clean_description, clean_title,
    BlockerGraph, Task, TaskCreate, TaskState, TaskUpdate,
};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks
    List {
        /// Filter by workflow state (backlog, todo, in-progress, blocked, done)
        #[arg(long)]
        state: Option<TaskState>,

        /// Filter by a title substring (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Show only overdue tasks
        #[arg(long)]
        overdue: bool,
    },

    /// Show task details
    Show {
        /// Task ID
        id: i64,
    },

    /// Create a task
    Create {
        /// Task title
        title: String,

        /// Description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Initial workflow state (the service defaults to To Do)
        #[arg(long)]
        state: Option<TaskState>,
    },

    /// Update task fields (only the provided ones change)
    Update {
        /// Task ID
        id: i64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// New workflow state
        #[arg(long)]
        state: Option<TaskState>,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },

    /// Move a task to a new workflow state
    State {
        /// Task ID
        id: i64,

        /// Target state (backlog, todo, in-progress, blocked, done)
        state: TaskState,
    },

    /// Show a task's blockers and dependents
    Deps {
        /// Task ID
        id: i64,

        /// Also list tasks that could still become blockers
        #[arg(long)]
        available: bool,
    },

    /// Check blocker data for missing inverse entries and cycles
    Audit,

    /// Add a blocker: BLOCKER must complete before TASK
    Block {
        /// Task that will wait
        task: i64,

        /// Task that must complete first
        blocker: i64,
    },

    /// Remove a blocker from a task
    Unblock {
        /// Task to unblock
        task: i64,

        /// Blocker to remove
        blocker: i64,
    },
}

pub fn run(cmd: TaskCommands, client: &ApiClient, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::List {
            state,
            search,
            overdue,
        } => list_tasks(output, client, state, search.as_deref(), overdue),
        TaskCommands::Show { id } => show_task(output, client, id),
        TaskCommands::Create {
            title,
            description,
            due,
            state,
        } => create_task(output, client, &title, description.as_deref(), due.as_deref(), state),
        TaskCommands::Update {
            id,
            title,
            description,
            due,
            state,
        } => update_task(
            output,
            client,
            id,
            title.as_deref(),
            description.as_deref(),
            due.as_deref(),
            state,
        ),
        TaskCommands::Delete { id } => delete_task(output, client, id),
        TaskCommands::State { id, state } => set_state(output, client, id, state),
        TaskCommands::Deps { id, available } => show_deps(output, client, id, available),
        TaskCommands::Audit => audit(output, client),
        TaskCommands::Block { task, blocker } => add_blocker(output, client, task, blocker),
        TaskCommands::Unblock { task, blocker } => remove_blocker(output, client, task, blocker),
    }
}

fn list_tasks(
    output: &Output,
    client: &ApiClient,
    state: Option<TaskState>,
    search: Option<&str>,
    overdue_only: bool,
) -> Result<()> {
    output.verbose_ctx("tasks", &format!("GET {}/tasks", client.base_url()));
    let mut tasks = client.list_tasks()?;
    output.verbose_ctx("tasks", &format!("Fetched {} tasks", tasks.len()));

    let now = Utc::now();
    tasks.sort_by_key(|t| t.id);
    tasks.retain(|t| {
        state.map_or(true, |s| t.state == s)
            && search.map_or(true, |needle| {
                t.title
                    .to_ascii_lowercase()
                    .contains(&needle.to_ascii_lowercase())
            })
            && (!overdue_only || t.is_overdue(now))
    });

    if output.is_json() {
        let items: Vec<_> = tasks
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "title": t.title,
                    "state": t.state,
                    "due_date": t.due_date,
                    "overdue": t.is_overdue(now),
                    "blockers": t.blockers,
                    "dependents": t.dependents,
                })
            })
            .collect();
        output.data(&items);
    } else if tasks.is_empty() {
        if state.is_some() || search.is_some() || overdue_only {
            println!("No tasks match the given filters");
        } else {
            println!("No tasks");
        }
    } else {
        println!("{:<6} {:<12} {:<12} {:>4} {:>4}  TITLE", "ID", "STATE", "DUE", "BLK", "DEP");
        println!("{}", "-".repeat(70));

        for task in &tasks {
            let due = match task.due_date {
                Some(date) if task.is_overdue(now) => format!("{}!", date.format("%Y-%m-%d")),
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => "-".to_string(),
            };
            println!(
                "{:<6} {:<12} {:<12} {:>4} {:>4}  {}",
                task.id,
                task.state.label(),
                due,
                task.blockers.len(),
                task.dependents.len(),
                task.title
            );
        }
    }

    Ok(())
}

fn show_task(output: &Output, client: &ApiClient, id: i64) -> Result<()> {
    output.verbose_ctx("tasks", &format!("GET {}/tasks/{}", client.base_url(), id));
    let task = client.get_task(id)?;
    let now = Utc::now();

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "title": task.title,
            "description": task.description,
            "state": task.state,
            "due_date": task.due_date,
            "overdue": task.is_overdue(now),
            "created_at": task.created_at,
            "updated_at": task.updated_at,
            "completed_at": task.completed_at,
            "blockers": task.blockers,
            "dependents": task.dependents,
        }));
    } else {
        println!("Task #{}", task.id);
        println!("Title: {}", task.title);
        println!("State: {}", task.state.label());

        match task.due_date {
            Some(due) if task.is_overdue(now) => {
                println!("Due: {} (overdue)", due.format("%Y-%m-%d"))
            }
            Some(due) => println!("Due: {}", due.format("%Y-%m-%d")),
            None => {}
        }

        println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
        println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));
        if let Some(completed) = task.completed_at {
            println!("Completed: {}", completed.format("%Y-%m-%d %H:%M"));
        }

        if !task.blockers.is_empty() {
            let ids: Vec<String> = task.blockers.iter().map(|b| format!("#{}", b)).collect();
            println!("Blocked by: {}", ids.join(", "));
        }
        if !task.dependents.is_empty() {
            let ids: Vec<String> = task.dependents.iter().map(|d| format!("#{}", d)).collect();
            println!("Blocks: {}", ids.join(", "));
        }

        if let Some(desc) = &task.description {
            println!();
            println!("{}", desc);
        }
    }

    Ok(())
}

fn create_task(
    output: &Output,
    client: &ApiClient,
    title: &str,
    description: Option<&str>,
    due: Option<&str>,
    state: Option<TaskState>,
) -> Result<()> {
    let title = clean_title(title).ok_or_else(|| anyhow::anyhow!("Title must not be empty"))?;

    let mut body = TaskCreate::new(title);
    body.description = description.and_then(clean_description);
    body.due_date = due.map(parse_due).transpose()?;
    body.state = state;

    output.verbose_ctx("tasks", &format!("POST {}/tasks", client.base_url()));
    let task = client.create_task(&body)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "title": task.title,
            "state": task.state,
        }));
    } else {
        output.success(&format!("Created task #{}: {}", task.id, task.title));
    }

    Ok(())
}

fn update_task(
    output: &Output,
    client: &ApiClient,
    id: i64,
    title: Option<&str>,
    description: Option<&str>,
    due: Option<&str>,
    state: Option<TaskState>,
) -> Result<()> {
    let mut body = TaskUpdate::new();

    if let Some(raw) = title {
        body.title =
            Some(clean_title(raw).ok_or_else(|| anyhow::anyhow!("Title must not be empty"))?);
    }
    body.description = description.and_then(clean_description);
    body.due_date = due.map(parse_due).transpose()?;
    body.state = state;

    if body.is_empty() {
        anyhow::bail!("Nothing to update (pass --title, --description, --due, or --state)");
    }

    output.verbose_ctx("tasks", &format!("PATCH {}/tasks/{}", client.base_url(), id));
    let task = client.update_task(id, &body)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "title": task.title,
            "state": task.state,
            "due_date": task.due_date,
        }));
    } else {
        output.success(&format!("Updated task #{}", task.id));
    }

    Ok(())
}

fn delete_task(output: &Output, client: &ApiClient, id: i64) -> Result<()> {
    output.verbose_ctx("tasks", &format!("DELETE {}/tasks/{}", client.base_url(), id));
    client.delete_task(id)?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id, "deleted": true }));
    } else {
        output.success(&format!("Deleted task #{}", id));
    }

    Ok(())
}

fn set_state(output: &Output, client: &ApiClient, id: i64, state: TaskState) -> Result<()> {
    output.verbose_ctx(
        "tasks",
        &format!(
            "POST {}/tasks/{}/state/{}",
            client.base_url(),
            id,
            state.wire_name()
        ),
    );
    let task = client.set_task_state(id, state)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "state": task.state,
        }));
    } else {
        output.success(&format!("Task #{} moved to {}", task.id, task.state.label()));
    }

    Ok(())
}

fn show_deps(output: &Output, client: &ApiClient, id: i64, available: bool) -> Result<()> {
    let tasks = client.list_tasks()?;
    let task = tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: #{}", id))?;

    let graph = BlockerGraph::from_tasks(&tasks);
    let by_id: HashMap<i64, &Task> = tasks.iter().map(|t| (t.id, t)).collect();

    let blockers = graph.blockers_of(id);
    let dependents = graph.dependents_of(id);
    let candidates: Vec<&Task> = if available {
        graph.available_blockers(id, &tasks)
    } else {
        vec![]
    };

    if output.is_json() {
        let describe = |ids: &[i64]| -> Vec<serde_json::Value> {
            ids.iter()
                .map(|other| match by_id.get(other) {
                    Some(t) => serde_json::json!({
                        "id": t.id,
                        "title": t.title,
                        "state": t.state,
                    }),
                    None => serde_json::json!({ "id": other }),
                })
                .collect()
        };

        let mut value = serde_json::json!({
            "id": task.id,
            "title": task.title,
            "blockers": describe(&blockers),
            "dependents": describe(&dependents),
        });
        if available {
            value["available"] = serde_json::Value::Array(
                candidates
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "id": t.id,
                            "title": t.title,
                            "state": t.state,
                        })
                    })
                    .collect(),
            );
        }
        output.data(&value);
    } else {
        let line = |other: i64| match by_id.get(&other) {
            Some(t) => format!("  #{:<5} {:<12} {}", t.id, t.state.label(), t.title),
            None => format!("  #{:<5} (not fetched)", other),
        };

        println!("Task #{}: {}", task.id, task.title);

        println!();
        println!("Blocked by:");
        if blockers.is_empty() {
            println!("  (none)");
        }
        for blocker in &blockers {
            println!("{}", line(*blocker));
        }

        println!();
        println!("Blocks:");
        if dependents.is_empty() {
            println!("  (none)");
        }
        for dependent in &dependents {
            println!("{}", line(*dependent));
        }

        if available {
            println!();
            println!("Available blockers:");
            if candidates.is_empty() {
                println!("  (none)");
            }
            for candidate in &candidates {
                println!("  #{:<5} {:<12} {}", candidate.id, candidate.state.label(), candidate.title);
            }
        }
    }

    Ok(())
}

fn audit(output: &Output, client: &ApiClient) -> Result<()> {
    let tasks = client.list_tasks()?;
    output.verbose_ctx("audit", &format!("Checking {} tasks", tasks.len()));

    let mismatches = audit_edges(&tasks);
    let graph = BlockerGraph::from_tasks(&tasks);
    let cycles = graph.cycles();
    let edge_count: usize = tasks.iter().map(|t| t.blockers.len()).sum();

    if output.is_json() {
        output.data(&serde_json::json!({
            "tasks": tasks.len(),
            "edges": edge_count,
            "consistent": mismatches.is_empty() && cycles.is_empty(),
            "mismatches": mismatches.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
            "cycles": cycles,
        }));
    } else if mismatches.is_empty() && cycles.is_empty() {
        println!(
            "Blocker data is consistent ({} tasks, {} edges)",
            tasks.len(),
            edge_count
        );
    } else {
        for mismatch in &mismatches {
            println!("Mismatch: {}", mismatch);
        }
        for cycle in &cycles {
            let ids: Vec<String> = cycle.iter().map(|id| format!("#{}", id)).collect();
            println!("Cycle involving tasks {}", ids.join(", "));
        }
        println!();
        println!(
            "Found {} mismatch(es) and {} cycle(s)",
            mismatches.len(),
            cycles.len()
        );
    }

    Ok(())
}

fn add_blocker(output: &Output, client: &ApiClient, task_id: i64, blocker_id: i64) -> Result<()> {
    output.verbose_ctx("deps", &format!("GET {}/tasks/{}", client.base_url(), task_id));
    let task = client.get_task(task_id)?;

    check_add_blocker(&task, blocker_id)?;

    output.verbose_ctx(
        "deps",
        &format!(
            "POST {}/dependencies/{}/blockers/{}",
            client.base_url(),
            task_id,
            blocker_id
        ),
    );
    client.add_blocker(task_id, blocker_id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id,
            "blocker": blocker_id,
        }));
    } else {
        output.success(&format!(
            "Task #{} is now blocked by #{}",
            task_id, blocker_id
        ));
    }

    Ok(())
}

fn remove_blocker(
    output: &Output,
    client: &ApiClient,
    task_id: i64,
    blocker_id: i64,
) -> Result<()> {
    let task = client.get_task(task_id)?;

    check_remove_blocker(&task, blocker_id)?;

    output.verbose_ctx(
        "deps",
        &format!(
            "DELETE {}/dependencies/{}/blockers/{}",
            client.base_url(),
            task_id,
            blocker_id
        ),
    );
    client.remove_blocker(task_id, blocker_id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id,
            "removed_blocker": blocker_id,
        }));
    } else {
        output.success(&format!(
            "Task #{} is no longer blocked by #{}",
            task_id, blocker_id
        ));
    }

    Ok(())
}

/// Parses a due date given as YYYY-MM-DD (midnight UTC) or full RFC 3339
fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(stamp) = raw.parse::<DateTime<Utc>>() {
        return Ok(stamp);
    }

    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid due date: {} (use YYYY-MM-DD or RFC 3339)", raw))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}
