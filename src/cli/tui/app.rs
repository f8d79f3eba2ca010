//! Board application state and logic

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;

use super::event::{Event, EventHandler, OpKind, OpOutcome};
use super::ui::Terminal;
use super::views;
use super::ViewMode;
use crate::api::{ApiClient, ApiError};
use crate::domain::{
    check_add_blocker, check_remove_blocker, clean_title, demo_catalog, parse_blocker_id, Product,
    Task, TaskCreate, TaskState,
};

/// Status of the one service call a task row may have outstanding.
/// Rows absent from the status map are idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpStatus {
    /// A request for this row is in flight; its controls are inert
    Pending,
    /// The last request for this row failed
    Failed,
}

/// Action awaiting a y/n confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask(i64),
}

/// Input mode for the board
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a title for a new task
    NewTask(String),
    /// Typing a blocker id to add to the selected task
    AddBlocker(String),
    /// Typing a blocker id to remove from the selected task
    RemoveBlocker(String),
    /// Waiting for a confirmation keypress
    Confirm(ConfirmAction),
}

/// Board application state
pub struct App {
    /// Service client, cloned into worker threads
    client: ApiClient,
    /// Channel workers report their outcomes on
    tx: mpsc::Sender<Event>,
    /// All known tasks, sorted by id
    tasks: Vec<Task>,
    /// Product catalog shown on the products view
    products: Vec<Product>,
    /// Selected row in the task table
    task_index: usize,
    /// Selected row in the product table
    product_index: usize,
    /// Active view
    view_mode: ViewMode,
    /// Current input mode
    input_mode: InputMode,
    /// Per-task operation status
    ops: HashMap<i64, OpStatus>,
    /// A create call is in flight
    creating: bool,
    /// A list re-fetch is in flight
    refreshing: bool,
    /// One-line status or result message
    status_message: Option<String>,
    /// Whether the help overlay is visible
    show_help: bool,
    /// Whether the app should exit
    should_quit: bool,
}

impl App {
    /// Create the board state, fetching the initial task list
    pub fn new(client: ApiClient, tx: mpsc::Sender<Event>, view_mode: ViewMode) -> Result<Self> {
        let tasks = client.list_tasks()?;
        let mut app = Self {
            client,
            tx,
            tasks: Vec::new(),
            products: demo_catalog(),
            task_index: 0,
            product_index: 0,
            view_mode,
            input_mode: InputMode::default(),
            ops: HashMap::new(),
            creating: false,
            refreshing: false,
            status_message: None,
            show_help: false,
            should_quit: false,
        };
        app.set_tasks(tasks);
        Ok(app)
    }

    #[cfg(test)]
    fn with_tasks(tasks: Vec<Task>) -> Self {
        let (tx, _rx) = mpsc::channel();
        let mut app = Self {
            client: ApiClient::new("http://127.0.0.1:1"),
            tx,
            tasks: Vec::new(),
            products: demo_catalog(),
            task_index: 0,
            product_index: 0,
            view_mode: ViewMode::Tasks,
            input_mode: InputMode::default(),
            ops: HashMap::new(),
            creating: false,
            refreshing: false,
            status_message: None,
            show_help: false,
            should_quit: false,
        };
        app.set_tasks(tasks);
        app
    }

    /// Main loop: draw, then react to one event at a time
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            match events.next()? {
                Event::Key(key) => self.handle_key(key),
                Event::Resize(_, _) => {}
                Event::Tick => {}
                Event::Op(outcome) => self.on_op(outcome),
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    /// Draw the UI
    fn draw(&self, frame: &mut Frame) {
        match self.view_mode {
            ViewMode::Tasks => views::tasks::draw(frame, self),
            ViewMode::Products => views::products::draw(frame, self),
        }
    }

    // ---- key handling ----

    /// Route a key press according to the current input mode
    fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Any key dismisses the help overlay
        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::NewTask(_) => self.handle_new_task_key(key),
            InputMode::AddBlocker(_) => self.handle_add_blocker_key(key),
            InputMode::RemoveBlocker(_) => self.handle_remove_blocker_key(key),
            InputMode::Confirm(_) => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.toggle_view(),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Esc => self.status_message = None,
            _ => {
                if self.view_mode == ViewMode::Tasks {
                    self.handle_task_key(key);
                }
            }
        }
    }

    /// Keys only meaningful on the tasks view
    fn handle_task_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                self.request_state(TaskState::ALL[idx]);
            }
            KeyCode::Char('n') => {
                if self.creating {
                    self.status_message =
                        Some("A create request is already in flight".to_string());
                } else {
                    self.input_mode = InputMode::NewTask(String::new());
                    self.status_message = None;
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.guarded_selection() {
                    self.input_mode = InputMode::Confirm(ConfirmAction::DeleteTask(id));
                }
            }
            KeyCode::Char('b') => {
                if self.guarded_selection().is_some() {
                    self.input_mode = InputMode::AddBlocker(String::new());
                    self.status_message = None;
                }
            }
            KeyCode::Char('x') => {
                if self.guarded_selection().is_some() {
                    self.input_mode = InputMode::RemoveBlocker(String::new());
                    self.status_message = None;
                }
            }
            KeyCode::Char('r') => self.request_refresh(),
            _ => {}
        }
    }

    fn handle_new_task_key(&mut self, key: KeyEvent) {
        if let InputMode::NewTask(buf) = &mut self.input_mode {
            match key.code {
                KeyCode::Esc => self.input_mode = InputMode::Normal,
                KeyCode::Enter => {
                    let title = buf.clone();
                    self.input_mode = InputMode::Normal;
                    self.submit_new_task(&title);
                }
                KeyCode::Backspace => {
                    buf.pop();
                }
                KeyCode::Char(c) => buf.push(c),
                _ => {}
            }
        }
    }

    fn handle_add_blocker_key(&mut self, key: KeyEvent) {
        if let InputMode::AddBlocker(buf) = &mut self.input_mode {
            match key.code {
                KeyCode::Esc => self.input_mode = InputMode::Normal,
                KeyCode::Enter => {
                    let raw = buf.clone();
                    self.input_mode = InputMode::Normal;
                    self.submit_add_blocker(&raw);
                }
                KeyCode::Backspace => {
                    buf.pop();
                }
                KeyCode::Char(c) => buf.push(c),
                _ => {}
            }
        }
    }

    fn handle_remove_blocker_key(&mut self, key: KeyEvent) {
        if let InputMode::RemoveBlocker(buf) = &mut self.input_mode {
            match key.code {
                KeyCode::Esc => self.input_mode = InputMode::Normal,
                KeyCode::Enter => {
                    let raw = buf.clone();
                    self.input_mode = InputMode::Normal;
                    self.submit_remove_blocker(&raw);
                }
                KeyCode::Backspace => {
                    buf.pop();
                }
                KeyCode::Char(c) => buf.push(c),
                _ => {}
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let InputMode::Confirm(action) = self.input_mode else {
            return;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                match action {
                    ConfirmAction::DeleteTask(id) => self.request_delete(id),
                }
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    // ---- navigation ----

    fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Tasks => ViewMode::Products,
            ViewMode::Products => ViewMode::Tasks,
        };
    }

    fn visible_len(&self) -> usize {
        match self.view_mode {
            ViewMode::Tasks => self.tasks.len(),
            ViewMode::Products => self.products.len(),
        }
    }

    fn move_down(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        match self.view_mode {
            ViewMode::Tasks => self.task_index = (self.task_index + 1) % len,
            ViewMode::Products => self.product_index = (self.product_index + 1) % len,
        }
    }

    fn move_up(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        match self.view_mode {
            ViewMode::Tasks => self.task_index = (self.task_index + len - 1) % len,
            ViewMode::Products => self.product_index = (self.product_index + len - 1) % len,
        }
    }

    // ---- service calls ----

    /// The selected task id, unless that row already has a call in flight
    fn guarded_selection(&mut self) -> Option<i64> {
        let id = self.selected_task()?.id;
        if matches!(self.ops.get(&id), Some(OpStatus::Pending)) {
            self.status_message = Some(format!("Task #{} has a request in flight", id));
            None
        } else {
            Some(id)
        }
    }

    fn request_state(&mut self, state: TaskState) {
        let Some(id) = self.guarded_selection() else {
            return;
        };
        self.ops.insert(id, OpStatus::Pending);
        self.status_message = None;
        self.spawn_op(
            OpKind::Task(id),
            format!("Task #{} moved to {}", id, state.label()),
            move |client| client.set_task_state(id, state).map(|_| ()),
        );
    }

    fn request_delete(&mut self, id: i64) {
        self.ops.insert(id, OpStatus::Pending);
        self.status_message = None;
        self.spawn_op(
            OpKind::Task(id),
            format!("Deleted task #{}", id),
            move |client| client.delete_task(id),
        );
    }

    fn request_refresh(&mut self) {
        if self.refreshing {
            return;
        }
        self.refreshing = true;
        self.spawn_op(OpKind::Refresh, "Refreshed".to_string(), |_| Ok(()));
    }

    fn submit_new_task(&mut self, raw: &str) {
        let Some(title) = clean_title(raw) else {
            self.status_message = Some("Title must not be empty".to_string());
            return;
        };
        self.creating = true;
        let note = format!("Created task: {}", title);
        let body = TaskCreate::new(title);
        self.spawn_op(OpKind::Create, note, move |client| {
            client.create_task(&body).map(|_| ())
        });
    }

    /// Validate a blocker id against the selected task, then issue the call.
    /// Input the checks reject never reaches the service.
    fn submit_add_blocker(&mut self, raw: &str) {
        let blocker = match parse_blocker_id(raw) {
            Ok(b) => b,
            Err(e) => {
                self.status_message = Some(e.to_string());
                return;
            }
        };
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id;
        if let Err(e) = check_add_blocker(task, blocker) {
            self.status_message = Some(e.to_string());
            return;
        }
        self.ops.insert(id, OpStatus::Pending);
        self.spawn_op(
            OpKind::Task(id),
            format!("Task #{} is now blocked by #{}", id, blocker),
            move |client| client.add_blocker(id, blocker),
        );
    }

    fn submit_remove_blocker(&mut self, raw: &str) {
        let blocker = match parse_blocker_id(raw) {
            Ok(b) => b,
            Err(e) => {
                self.status_message = Some(e.to_string());
                return;
            }
        };
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id;
        if let Err(e) = check_remove_blocker(task, blocker) {
            self.status_message = Some(e.to_string());
            return;
        }
        self.ops.insert(id, OpStatus::Pending);
        self.spawn_op(
            OpKind::Task(id),
            format!("Task #{} is no longer blocked by #{}", id, blocker),
            move |client| client.remove_blocker(id, blocker),
        );
    }

    /// Run one service call off the UI thread, then re-fetch the task list
    /// and report back through the event channel
    fn spawn_op<F>(&self, kind: OpKind, note: String, op: F)
    where
        F: FnOnce(&ApiClient) -> Result<(), ApiError> + Send + 'static,
    {
        let client = self.client.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = op(&client)
                .map_err(|e| e.to_string())
                .and_then(|()| client.list_tasks().map_err(|e| e.to_string()));
            // The UI loop may already be gone on quit
            let _ = tx.send(Event::Op(OpOutcome { kind, note, result }));
        });
    }

    /// Fold a finished service call back into the board state
    fn on_op(&mut self, outcome: OpOutcome) {
        match outcome.kind {
            OpKind::Task(id) => {
                if outcome.result.is_ok() {
                    self.ops.remove(&id);
                } else {
                    self.ops.insert(id, OpStatus::Failed);
                }
            }
            OpKind::Create => self.creating = false,
            OpKind::Refresh => self.refreshing = false,
        }
        match outcome.result {
            Ok(tasks) => {
                self.set_tasks(tasks);
                self.status_message = Some(outcome.note);
            }
            Err(msg) => self.status_message = Some(msg),
        }
    }

    /// Replace the task list, keeping the selection in range
    fn set_tasks(&mut self, mut tasks: Vec<Task>) {
        tasks.sort_by_key(|t| t.id);
        self.tasks = tasks;
        if self.task_index >= self.tasks.len() {
            self.task_index = self.tasks.len().saturating_sub(1);
        }
    }

    // ---- accessors used by the view layer ----

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn task_index(&self) -> usize {
        self.task_index
    }

    pub fn product_index(&self) -> usize {
        self.product_index
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.task_index)
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn op_status(&self, id: i64) -> Option<OpStatus> {
        self.ops.get(&id).copied()
    }

    pub fn creating(&self) -> bool {
        self.creating
    }

    pub fn refreshing(&self) -> bool {
        self.refreshing
    }

    /// Title of a task by id, when it is known
    pub fn task_title(&self, id: i64) -> Option<&str> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.title.as_str())
    }

    /// Number of tasks currently overdue
    pub fn overdue_count(&self) -> usize {
        let now = Utc::now();
        self.tasks.iter().filter(|t| t.is_overdue(now)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn task(id: i64, state: TaskState, blockers: &[i64], dependents: &[i64]) -> Task {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Task {
            id,
            title: format!("Task {}", id),
            description: None,
            state,
            due_date: None,
            created_at: t0,
            updated_at: t0,
            completed_at: None,
            blockers: blockers.to_vec(),
            dependents: dependents.to_vec(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn three_tasks() -> Vec<Task> {
        vec![
            task(1, TaskState::Todo, &[], &[]),
            task(2, TaskState::InProgress, &[], &[]),
            task(3, TaskState::Done, &[], &[]),
        ]
    }

    // ==================== Navigation ====================

    #[test]
    fn selection_wraps_moving_down() {
        let mut app = App::with_tasks(three_tasks());
        assert_eq!(app.task_index(), 0);
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.task_index(), 2);
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.task_index(), 0);
    }

    #[test]
    fn selection_wraps_moving_up() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.task_index(), 2);
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.task_index(), 1);
    }

    #[test]
    fn navigation_on_empty_list_is_inert() {
        let mut app = App::with_tasks(Vec::new());
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.task_index(), 0);
        assert!(app.selected_task().is_none());
    }

    #[test]
    fn tasks_are_sorted_by_id() {
        let app = App::with_tasks(vec![
            task(9, TaskState::Todo, &[], &[]),
            task(2, TaskState::Todo, &[], &[]),
        ]);
        let ids: Vec<i64> = app.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 9]);
    }

    // ==================== View switching ====================

    #[test]
    fn tab_toggles_between_tasks_and_products() {
        let mut app = App::with_tasks(three_tasks());
        assert_eq!(app.view_mode, ViewMode::Tasks);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view_mode, ViewMode::Products);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view_mode, ViewMode::Tasks);
    }

    #[test]
    fn product_selection_is_independent_of_task_selection() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.product_index(), 1);
        assert_eq!(app.task_index(), 0);
    }

    // ==================== Input modes ====================

    #[test]
    fn new_task_prompt_collects_and_cancels() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Char('i')));
        match app.input_mode() {
            InputMode::NewTask(buf) => assert_eq!(buf, "hi"),
            other => panic!("unexpected mode: {:?}", other),
        }
        app.handle_key(key(KeyCode::Backspace));
        match app.input_mode() {
            InputMode::NewTask(buf) => assert_eq!(buf, "h"),
            other => panic!("unexpected mode: {:?}", other),
        }
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(*app.input_mode(), InputMode::Normal);
    }

    #[test]
    fn q_types_into_prompts_instead_of_quitting() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        match app.input_mode() {
            InputMode::NewTask(buf) => assert_eq!(buf, "q"),
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn empty_title_is_rejected_locally() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(*app.input_mode(), InputMode::Normal);
        assert_eq!(app.status_message(), Some("Title must not be empty"));
        assert!(!app.creating());
    }

    // ==================== Pending gating ====================

    #[test]
    fn state_keys_are_inert_while_row_pending() {
        let mut app = App::with_tasks(three_tasks());
        app.ops.insert(1, OpStatus::Pending);
        app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(app.op_status(1), Some(OpStatus::Pending));
        assert_eq!(
            app.status_message(),
            Some("Task #1 has a request in flight")
        );
    }

    #[test]
    fn delete_prompt_is_inert_while_row_pending() {
        let mut app = App::with_tasks(three_tasks());
        app.ops.insert(1, OpStatus::Pending);
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(*app.input_mode(), InputMode::Normal);
    }

    #[test]
    fn blocker_prompt_is_inert_while_row_pending() {
        let mut app = App::with_tasks(three_tasks());
        app.ops.insert(1, OpStatus::Pending);
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(*app.input_mode(), InputMode::Normal);
    }

    #[test]
    fn failed_rows_accept_new_requests() {
        let mut app = App::with_tasks(three_tasks());
        app.ops.insert(1, OpStatus::Failed);
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(
            *app.input_mode(),
            InputMode::Confirm(ConfirmAction::DeleteTask(1))
        );
    }

    #[test]
    fn create_key_is_inert_while_create_in_flight() {
        let mut app = App::with_tasks(three_tasks());
        app.creating = true;
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(*app.input_mode(), InputMode::Normal);
        assert_eq!(
            app.status_message(),
            Some("A create request is already in flight")
        );
    }

    // ==================== Blocker prompts ====================

    fn submit_blocker_input(app: &mut App, open: char, input: &str) {
        app.handle_key(key(KeyCode::Char(open)));
        for c in input.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
    }

    #[test]
    fn add_blocker_rejects_unparseable_input() {
        let mut app = App::with_tasks(vec![task(5, TaskState::Todo, &[9], &[7])]);
        submit_blocker_input(&mut app, 'b', "abc");
        assert_eq!(*app.input_mode(), InputMode::Normal);
        assert_eq!(
            app.status_message(),
            Some("blocker id must be a positive integer")
        );
        assert!(app.op_status(5).is_none());
    }

    #[test]
    fn add_blocker_rejects_self_reference() {
        let mut app = App::with_tasks(vec![task(5, TaskState::Todo, &[9], &[7])]);
        submit_blocker_input(&mut app, 'b', "5");
        assert_eq!(app.status_message(), Some("a task cannot block itself"));
        assert!(app.op_status(5).is_none());
    }

    #[test]
    fn add_blocker_rejects_existing_blocker() {
        let mut app = App::with_tasks(vec![task(5, TaskState::Todo, &[9], &[7])]);
        submit_blocker_input(&mut app, 'b', "9");
        assert_eq!(app.status_message(), Some("task #9 is already a blocker"));
        assert!(app.op_status(5).is_none());
    }

    #[test]
    fn add_blocker_rejects_two_task_cycle() {
        let mut app = App::with_tasks(vec![task(5, TaskState::Todo, &[9], &[7])]);
        submit_blocker_input(&mut app, 'b', "7");
        assert_eq!(
            app.status_message(),
            Some("adding task #7 as a blocker would create a circular dependency")
        );
        assert!(app.op_status(5).is_none());
    }

    #[test]
    fn remove_blocker_rejects_non_member() {
        let mut app = App::with_tasks(vec![task(5, TaskState::Todo, &[9], &[7])]);
        submit_blocker_input(&mut app, 'x', "3");
        assert_eq!(
            app.status_message(),
            Some("task #3 is not a blocker of this task")
        );
        assert!(app.op_status(5).is_none());
    }

    // ==================== Confirmation ====================

    #[test]
    fn delete_requires_confirmation() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(
            *app.input_mode(),
            InputMode::Confirm(ConfirmAction::DeleteTask(1))
        );
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(*app.input_mode(), InputMode::Normal);
        assert!(app.op_status(1).is_none());
    }

    #[test]
    fn confirming_delete_marks_row_pending() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(*app.input_mode(), InputMode::Normal);
        assert_eq!(app.op_status(1), Some(OpStatus::Pending));
    }

    // ==================== Outcome routing ====================

    #[test]
    fn successful_row_op_clears_pending_and_replaces_list() {
        let mut app = App::with_tasks(three_tasks());
        app.ops.insert(2, OpStatus::Pending);
        let mut fresh = three_tasks();
        fresh.push(task(4, TaskState::Backlog, &[], &[]));
        app.on_op(OpOutcome {
            kind: OpKind::Task(2),
            note: "Task #2 moved to Done".to_string(),
            result: Ok(fresh),
        });
        assert!(app.op_status(2).is_none());
        assert_eq!(app.tasks().len(), 4);
        assert_eq!(app.status_message(), Some("Task #2 moved to Done"));
    }

    #[test]
    fn failed_row_op_marks_row_failed_and_keeps_list() {
        let mut app = App::with_tasks(three_tasks());
        app.ops.insert(2, OpStatus::Pending);
        app.on_op(OpOutcome {
            kind: OpKind::Task(2),
            note: "Task #2 moved to Done".to_string(),
            result: Err("failed to set task state (HTTP 500)".to_string()),
        });
        assert_eq!(app.op_status(2), Some(OpStatus::Failed));
        assert_eq!(app.tasks().len(), 3);
        assert_eq!(
            app.status_message(),
            Some("failed to set task state (HTTP 500)")
        );
    }

    #[test]
    fn create_outcome_clears_creating_flag() {
        let mut app = App::with_tasks(three_tasks());
        app.creating = true;
        app.on_op(OpOutcome {
            kind: OpKind::Create,
            note: "Created task: Ship it".to_string(),
            result: Ok(three_tasks()),
        });
        assert!(!app.creating());
        assert_eq!(app.status_message(), Some("Created task: Ship it"));
    }

    #[test]
    fn refresh_outcome_clears_refreshing_flag() {
        let mut app = App::with_tasks(three_tasks());
        app.refreshing = true;
        app.on_op(OpOutcome {
            kind: OpKind::Refresh,
            note: "Refreshed".to_string(),
            result: Err("failed to fetch tasks".to_string()),
        });
        assert!(!app.refreshing());
        assert_eq!(app.status_message(), Some("failed to fetch tasks"));
    }

    #[test]
    fn selection_clamps_when_list_shrinks() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.task_index(), 2);
        app.on_op(OpOutcome {
            kind: OpKind::Task(3),
            note: "Deleted task #3".to_string(),
            result: Ok(vec![task(1, TaskState::Todo, &[], &[])]),
        });
        assert_eq!(app.task_index(), 0);
    }

    // ==================== Help and quitting ====================

    #[test]
    fn help_overlay_toggles_and_any_key_dismisses() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.show_help());
        app.handle_key(key(KeyCode::Char('j')));
        assert!(!app.show_help());
        assert_eq!(app.task_index(), 0);
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        let mut app = App::with_tasks(three_tasks());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = App::with_tasks(three_tasks());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn esc_clears_the_status_message() {
        let mut app = App::with_tasks(three_tasks());
        app.status_message = Some("stale".to_string());
        app.handle_key(key(KeyCode::Esc));
        assert!(app.status_message().is_none());
    }

    // ==================== Derived info ====================

    #[test]
    fn overdue_count_skips_done_tasks() {
        let yesterday = Utc::now() - Duration::days(1);
        let mut open = task(1, TaskState::InProgress, &[], &[]);
        open.due_date = Some(yesterday);
        let mut done = task(2, TaskState::Done, &[], &[]);
        done.due_date = Some(yesterday);
        let app = App::with_tasks(vec![open, done]);
        assert_eq!(app.overdue_count(), 1);
    }

    #[test]
    fn task_title_resolves_known_ids() {
        let app = App::with_tasks(three_tasks());
        assert_eq!(app.task_title(2), Some("Task 2"));
        assert!(app.task_title(99).is_none());
    }
}
