use std::error::Error;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::cli::handlers::load_project_from;
use crate::io::clock::{DeadlineClock, now_millis};
use crate::io::logging::init_logging;
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::io::watcher::TasksWatcher;
use crate::model::config::Backend;
use crate::model::task::{Task, parse_deadline};
use crate::ops::interact::{Notice, NoticeKind, TaskInput};
use crate::ops::sort::{SortKey, sorted_view};
use crate::store::{AdapterError, open_store};
use crate::sync::{Outcome, PendingOp, Reply, SyncWorker, TaskStore};
use crate::util::unicode::{next_grapheme_boundary, prev_grapheme_boundary};

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// The add/edit form is open
    Form,
    /// Waiting for a yes/no on a delete
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Add,
    Edit { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Text,
    Deadline,
}

/// The two-field task form
#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub text: String,
    pub deadline: String,
    pub focus: FormField,
    /// Byte offset of the cursor in the focused field
    pub cursor: usize,
    /// Shown under the fields when the deadline does not parse
    pub error: Option<String>,
}

impl FormState {
    fn new(kind: FormKind, text: &str, deadline: &str) -> Self {
        FormState {
            kind,
            text: text.to_string(),
            deadline: deadline.to_string(),
            focus: FormField::Text,
            cursor: text.len(),
            error: None,
        }
    }

    pub fn focused(&self) -> &str {
        match self.focus {
            FormField::Text => &self.text,
            FormField::Deadline => &self.deadline,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Text => &mut self.text,
            FormField::Deadline => &mut self.deadline,
        }
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            FormField::Text => FormField::Deadline,
            FormField::Deadline => FormField::Text,
        };
        self.cursor = self.focused().len();
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.cursor;
        self.focused_mut().insert(at, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        let at = self.cursor;
        if let Some(prev) = prev_grapheme_boundary(self.focused(), at) {
            self.focused_mut().replace_range(prev..at, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        let at = self.cursor;
        if let Some(next) = next_grapheme_boundary(self.focused(), at) {
            self.focused_mut().replace_range(at..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = prev_grapheme_boundary(self.focused(), self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = next_grapheme_boundary(self.focused(), self.cursor) {
            self.cursor = next;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.focused().len();
    }
}

/// A notice on the status row, cleared by the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: NoticeKind,
}

/// Main application state
pub struct App {
    pub store: TaskStore,
    pub sort: SortKey,
    /// Index into the sorted view
    pub cursor: usize,
    pub scroll_offset: usize,
    pub mode: Mode,
    pub form: Option<FormState>,
    /// Task awaiting delete confirmation
    pub confirm_id: Option<String>,
    pub status: Option<StatusMessage>,
    pub theme: Theme,
    /// Time of the latest clock tick
    pub now_ms: i64,
    /// Remote calls waiting to be handed to the sync worker
    pub outbox: Vec<PendingOp>,
    /// A load is in flight
    pub loading: bool,
    /// Another load was requested while one was in flight
    reload_queued: bool,
    /// Add, edit, toggle and remove calls not yet answered, oldest first
    unanswered: Vec<PendingOp>,
    /// The tasks file changed while writes were in flight
    reload_after_writes: bool,
    pub backend_name: &'static str,
    pub should_quit: bool,
    /// Task to put the cursor on once the first load lands
    restore_cursor_id: Option<String>,
}

impl App {
    pub fn new(store: TaskStore, sort: SortKey, theme: Theme, backend_name: &'static str) -> Self {
        App {
            store,
            sort,
            cursor: 0,
            scroll_offset: 0,
            mode: Mode::Navigate,
            form: None,
            confirm_id: None,
            status: None,
            theme,
            now_ms: now_millis(),
            outbox: Vec::new(),
            loading: false,
            reload_queued: false,
            unanswered: Vec::new(),
            reload_after_writes: false,
            backend_name,
            should_quit: false,
            restore_cursor_id: None,
        }
    }

    /// Tasks in display order
    pub fn view(&self) -> Vec<&Task> {
        sorted_view(self.store.tasks(), self.sort, self.now_ms)
    }

    pub fn cursor_task_id(&self) -> Option<String> {
        self.view().get(self.cursor).map(|t| t.id.clone())
    }

    fn clamp_cursor(&mut self) {
        let len = self.store.len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    /// Put the cursor on `id` if it is in the view
    pub fn move_cursor_to(&mut self, id: &str) {
        if let Some(idx) = self.view().iter().position(|t| t.id == id) {
            self.cursor = idx;
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    pub fn set_status(&mut self, notice: Notice) {
        self.status = Some(StatusMessage {
            text: notice.message,
            kind: notice.kind,
        });
    }

    pub fn tick(&mut self, now_ms: i64) {
        self.now_ms = now_ms;
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Queue a load, or remember to run one after the load in flight
    pub fn request_reload(&mut self) {
        if self.loading {
            self.reload_queued = true;
            return;
        }
        self.loading = true;
        self.outbox.push(self.store.begin_load());
    }

    /// The tasks file changed on disk. While our own writes are still
    /// unanswered the reload waits for them, so a listing taken before a
    /// write lands cannot undo its optimistic local change.
    pub fn external_change(&mut self) {
        if !self.unanswered.is_empty() {
            self.reload_after_writes = true;
        } else {
            self.request_reload();
        }
    }

    fn queue_write(&mut self, op: PendingOp) {
        self.unanswered.push(op.clone());
        self.outbox.push(op);
    }

    pub fn cycle_sort(&mut self) {
        let current = self.cursor_task_id();
        self.sort = self.sort.next();
        if let Some(id) = current {
            self.move_cursor_to(&id);
        }
        self.status = Some(StatusMessage {
            text: format!("sort: {}", self.sort.label()),
            kind: NoticeKind::Success,
        });
    }

    /// Flip the task under the cursor. Visible immediately.
    pub fn toggle_at_cursor(&mut self) {
        let Some(id) = self.cursor_task_id() else {
            return;
        };
        if let Some(op) = self.store.toggle(&id) {
            self.queue_write(op);
        }
        self.move_cursor_to(&id);
    }

    pub fn open_add_form(&mut self) {
        self.form = Some(FormState::new(FormKind::Add, "", ""));
        self.mode = Mode::Form;
    }

    pub fn open_edit_form(&mut self) {
        let Some(id) = self.cursor_task_id() else {
            return;
        };
        let Some(task) = self.store.get(&id) else {
            return;
        };
        self.form = Some(FormState::new(
            FormKind::Edit { id: id.clone() },
            &task.text,
            &task.deadline,
        ));
        self.mode = Mode::Form;
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.mode = Mode::Navigate;
    }

    /// Submit the form. Blank fields count as cancel; an unreadable deadline
    /// keeps the form open.
    pub fn submit_form(&mut self) {
        let Some(form) = &mut self.form else {
            return;
        };
        let Some(input) = TaskInput::new(form.text.clone(), form.deadline.clone()) else {
            self.cancel_form();
            return;
        };
        if parse_deadline(input.deadline.trim()).is_none() {
            form.error = Some("Format tenggat: YYYY-MM-DDTHH:MM".into());
            form.focus = FormField::Deadline;
            form.cursor = form.deadline.len();
            return;
        }
        let deadline = input.deadline.trim();

        let op = match &form.kind {
            FormKind::Add => self.store.begin_add(&input.text, deadline).ok(),
            FormKind::Edit { id } => self
                .store
                .begin_edit(id, &input.text, deadline)
                .ok()
                .flatten(),
        };
        if let Some(op) = op {
            self.queue_write(op);
        }
        self.cancel_form();
    }

    pub fn open_delete_confirm(&mut self) {
        if let Some(id) = self.cursor_task_id() {
            self.confirm_id = Some(id);
            self.mode = Mode::Confirm;
        }
    }

    pub fn answer_confirm(&mut self, yes: bool) {
        let id = self.confirm_id.take();
        self.mode = Mode::Navigate;
        if yes
            && let Some(id) = id
            && let Some(op) = self.store.begin_remove(&id)
        {
            self.queue_write(op);
        }
    }

    // -----------------------------------------------------------------------
    // Completions
    // -----------------------------------------------------------------------

    /// Fold a finished remote call into the app.
    pub fn apply_completion(&mut self, op: PendingOp, result: Result<Reply, AdapterError>) {
        let was_load = op == PendingOp::Load;
        if !was_load && let Some(idx) = self.unanswered.iter().position(|u| *u == op) {
            self.unanswered.remove(idx);
        }
        let outcome = self.store.complete(op, result);

        if was_load {
            self.loading = false;
            // The listing may predate toggles still on their way
            for pending in &self.unanswered {
                if let PendingOp::Toggle { id, completed } = pending {
                    self.store.set_completed(id, *completed);
                }
            }
            if let Some(id) = self.restore_cursor_id.take() {
                self.move_cursor_to(&id);
            }
            if self.reload_queued {
                self.reload_queued = false;
                self.request_reload();
            }
        } else if self.unanswered.is_empty() && self.reload_after_writes {
            self.reload_after_writes = false;
            self.request_reload();
        }
        if let Outcome::Added { id } = &outcome {
            let id = id.clone();
            self.move_cursor_to(&id);
        }
        self.clamp_cursor();

        if let Some(notice) = outcome.notice() {
            self.set_status(notice);
        }
    }

    fn ui_state(&self) -> UiState {
        UiState {
            sort: Some(self.sort),
            cursor_id: self.cursor_task_id(),
        }
    }

    fn restore(&mut self, state: UiState) {
        if let Some(sort) = state.sort {
            self.sort = sort;
        }
        self.restore_cursor_id = state.cursor_id;
    }
}

/// Run the TUI application
pub fn run(project_dir: Option<&str>) -> Result<(), Box<dyn Error>> {
    let project = load_project_from(project_dir)?;
    let _log_guard = init_logging(&project.dir, &project.config.log);

    let remote = open_store(&project.dir, &project.config.store)?;
    let backend_name = remote.backend_name();
    let mut worker = SyncWorker::start(remote)?;
    let mut clock = DeadlineClock::start()?;
    let watcher = if project.config.store.backend == Backend::File {
        TasksWatcher::start(&project.dir)
            .map_err(|e| tracing::warn!(error = %e, "not watching tasks.json"))
            .ok()
    } else {
        None
    };

    let mut app = App::new(
        TaskStore::with_journal(&project.dir),
        project.config.ui.sort,
        Theme::from_config(&project.config.ui),
        backend_name,
    );
    if let Some(state) = read_ui_state(&project.dir) {
        app.restore(state);
    }
    app.request_reload();
    tracing::info!(backend = backend_name, "tui started");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut runtime = Runtime {
        worker: &mut worker,
        clock: &mut clock,
        watcher: watcher.as_ref(),
    };
    let result = run_event_loop(&mut terminal, &mut app, &mut runtime);

    let _ = write_ui_state(&project.dir, &app.ui_state());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Dropping the worker waits for queued writes
    drop(worker);
    result
}

/// Background sources the event loop drains each iteration
struct Runtime<'a> {
    worker: &'a mut SyncWorker,
    clock: &'a mut DeadlineClock,
    watcher: Option<&'a TasksWatcher>,
}

impl Runtime<'_> {
    fn pump(&mut self, app: &mut App) {
        for op in std::mem::take(&mut app.outbox) {
            self.worker.submit(op);
        }
        for done in self.worker.poll() {
            app.apply_completion(done.op, done.result);
        }
        if self.clock.poll() {
            app.tick(self.clock.now_ms());
        }
        if self.watcher.is_some_and(|w| w.poll()) {
            app.external_change();
        }
    }
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runtime: &mut Runtime<'_>,
) -> Result<(), Box<dyn Error>> {
    loop {
        runtime.pump(app);
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            // Hand over anything queued by the last key
            runtime.pump(app);
            break;
        }
    }
    Ok(())
}

/// Run queued ops inline against `remote` until the outbox is empty
#[cfg(test)]
pub(crate) fn drain_against(app: &mut App, remote: &dyn crate::store::DocumentStore) {
    while !app.outbox.is_empty() {
        for op in std::mem::take(&mut app.outbox) {
            let result = op.execute(remote);
            app.apply_completion(op, result);
        }
    }
}
