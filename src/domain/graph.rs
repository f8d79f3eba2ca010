//! Blocker graph over fetched tasks
//!
//! The service sends each task with denormalized `blockers` and
//! `dependents` arrays. This module rebuilds the one relation behind
//! them: a directed edge set (blocker -> dependent) with both lookup
//! directions derived from it. The `blockers` arrays are the side of
//! record when building, since that is the side mutations write to;
//! `audit_edges` reports any disagreement between the two arrays.
//!
//! The graph is a view of server state, not a gatekeeper: it reports
//! cycles it can see but never blocks a mutation.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt;

use super::task::Task;

/// The blocker relation across a set of fetched tasks
#[derive(Debug, Default)]
pub struct BlockerGraph {
    /// The underlying directed graph (edge: blocker -> dependent)
    graph: DiGraph<i64, ()>,

    /// Map from task id to node index
    node_map: HashMap<i64, NodeIndex>,
}

impl BlockerGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds the graph from fetched tasks
    ///
    /// Every task becomes a node; every entry in a task's `blockers`
    /// array becomes an edge. Blocker ids that reference tasks outside
    /// the fetched set still get a node, so lookups stay total.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut graph = Self::new();

        let tasks: Vec<_> = tasks.into_iter().collect();
        for task in &tasks {
            graph.add_task(task.id);
        }

        for task in &tasks {
            for &blocker in &task.blockers {
                graph.add_edge(blocker, task.id);
            }
        }

        graph
    }

    /// Adds a node for a task id (no-op if already present)
    pub fn add_task(&mut self, task_id: i64) {
        self.ensure_node(task_id);
    }

    fn ensure_node(&mut self, task_id: i64) -> NodeIndex {
        match self.node_map.get(&task_id) {
            Some(idx) => *idx,
            None => {
                let idx = self.graph.add_node(task_id);
                self.node_map.insert(task_id, idx);
                idx
            }
        }
    }

    /// Records a blocker edge: `blocker` must complete before `dependent`
    ///
    /// Duplicate edges collapse to one.
    pub fn add_edge(&mut self, blocker: i64, dependent: i64) {
        let blocker_idx = self.ensure_node(blocker);
        let dependent_idx = self.ensure_node(dependent);
        self.graph.update_edge(blocker_idx, dependent_idx, ());
    }

    /// Returns the ids that block a task (derived, sorted)
    pub fn blockers_of(&self, task_id: i64) -> Vec<i64> {
        self.neighbors(task_id, petgraph::Direction::Incoming)
    }

    /// Returns the ids that wait on a task (derived, sorted)
    pub fn dependents_of(&self, task_id: i64) -> Vec<i64> {
        self.neighbors(task_id, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, task_id: i64, direction: petgraph::Direction) -> Vec<i64> {
        let idx = match self.node_map.get(&task_id) {
            Some(idx) => *idx,
            None => return vec![],
        };

        let mut ids: Vec<i64> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|idx| self.graph.node_weight(idx).copied())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Returns true if the relation contains any cycle
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns the task ids of every cycle component, sorted
    ///
    /// Each entry is one strongly connected component of size > 1
    /// (or a task blocking itself, should the service ever send one).
    pub fn cycles(&self) -> Vec<Vec<i64>> {
        let mut components: Vec<Vec<i64>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1
                    || (scc.len() == 1 && self.graph.find_edge(scc[0], scc[0]).is_some())
            })
            .map(|scc| {
                let mut ids: Vec<i64> = scc
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).copied())
                    .collect();
                ids.sort_unstable();
                ids
            })
            .collect();
        components.sort();
        components
    }

    /// Tasks that could still become blockers of `task_id`
    ///
    /// Everything except the task itself, its current blockers, and its
    /// current dependents.
    pub fn available_blockers<'a>(&self, task_id: i64, all: &'a [Task]) -> Vec<&'a Task> {
        let blockers = self.blockers_of(task_id);
        let dependents = self.dependents_of(task_id);

        all.iter()
            .filter(|t| {
                t.id != task_id && !blockers.contains(&t.id) && !dependents.contains(&t.id)
            })
            .collect()
    }

    /// Returns true if the graph knows the task id
    pub fn contains(&self, task_id: i64) -> bool {
        self.node_map.contains_key(&task_id)
    }

    /// Returns the number of known task ids
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}

/// A blocker edge whose inverse entry is missing on the other task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMismatch {
    /// The dependent lists the blocker, but the blocker's `dependents`
    /// array misses the dependent
    MissingDependent { blocker: i64, dependent: i64 },

    /// The blocker lists the dependent, but the dependent's `blockers`
    /// array misses the blocker
    MissingBlocker { blocker: i64, dependent: i64 },
}

impl fmt::Display for EdgeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeMismatch::MissingDependent { blocker, dependent } => write!(
                f,
                "task #{} lists #{} as a blocker, but #{}'s dependents miss #{}",
                dependent, blocker, blocker, dependent
            ),
            EdgeMismatch::MissingBlocker { blocker, dependent } => write!(
                f,
                "task #{} lists #{} as a dependent, but #{}'s blockers miss #{}",
                blocker, dependent, dependent, blocker
            ),
        }
    }
}

/// Checks that `blockers` and `dependents` are inverse views of one
/// relation across the fetched set
///
/// Edges pointing at tasks outside the set cannot be checked and are
/// skipped.
pub fn audit_edges(tasks: &[Task]) -> Vec<EdgeMismatch> {
    let by_id: HashMap<i64, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let mut mismatches = Vec::new();

    for task in tasks {
        for &blocker in &task.blockers {
            if let Some(other) = by_id.get(&blocker) {
                if !other.dependents.contains(&task.id) {
                    mismatches.push(EdgeMismatch::MissingDependent {
                        blocker,
                        dependent: task.id,
                    });
                }
            }
        }
        for &dependent in &task.dependents {
            if let Some(other) = by_id.get(&dependent) {
                if !other.blockers.contains(&task.id) {
                    mismatches.push(EdgeMismatch::MissingBlocker {
                        blocker: task.id,
                        dependent,
                    });
                }
            }
        }
    }

    mismatches
}
