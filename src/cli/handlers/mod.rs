mod init;
pub use init::cmd_init;

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::clock::now_millis;
use crate::io::config_io;
use crate::io::logging;
use crate::io::project_io::{self, ProjectError};
use crate::io::sync_log;
use crate::model::config::Backend;
use crate::model::project::Project;
use crate::ops::interact::{self, Interaction, Notice, NoticeKind, TaskInput};
use crate::ops::sort::{SortKey, sorted_view};
use crate::store::{DocumentStore, open_store};
use crate::sync::{Outcome, TaskStore};

/// Shown by `tdl list` when there is nothing to list
pub const EMPTY_LIST: &str = "Belum ada tugas ditambahkan";

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let json = cli.json;
    let project_dir = cli.project_dir.as_deref();

    match cli.command {
        None => crate::tui::run(project_dir),
        Some(cmd) => match cmd {
            // Init is handled in main.rs before project discovery
            Commands::Init(args) => cmd_init(args),

            Commands::List(args) => cmd_list(project_dir, args, json),
            Commands::Add(args) => cmd_add(project_dir, args, json),
            Commands::Edit(args) => cmd_edit(project_dir, args, json),
            Commands::Toggle(args) => cmd_toggle(project_dir, args, json),
            Commands::Rm(args) => cmd_rm(project_dir, args, json),

            Commands::Log(args) => cmd_log(project_dir, args, json),
            Commands::Config(args) => cmd_config(project_dir, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Find and load the project, honoring `-C`.
pub fn load_project_from(project_dir: Option<&str>) -> Result<Project, Box<dyn Error>> {
    let start = match project_dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir().map_err(|e| ProjectError::ReadError {
            path: PathBuf::from("."),
            source: e,
        })?,
    };
    let root = project_io::discover_project(&start)?;
    Ok(project_io::load_project(&root)?)
}

/// A loaded project with its store and logging in place
struct Session {
    project: Project,
    remote: Arc<dyn DocumentStore>,
    _log_guard: Option<WorkerGuard>,
}

impl Session {
    fn open(project_dir: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let project = load_project_from(project_dir)?;
        let log_guard = logging::init_logging(&project.dir, &project.config.log);
        let remote = open_store(&project.dir, &project.config.store)?;
        tracing::debug!(backend = remote.backend_name(), "store opened");
        Ok(Session {
            project,
            remote,
            _log_guard: log_guard,
        })
    }

    /// The current task list, read from the store
    fn load_tasks(&self) -> Result<TaskStore, Box<dyn Error>> {
        let mut store = TaskStore::with_journal(&self.project.dir);
        check(store.load(self.remote.as_ref()))?;
        Ok(store)
    }
}

/// Turn a failed sync into a command error
fn check(outcome: Outcome) -> Result<Outcome, Box<dyn Error>> {
    match outcome {
        Outcome::Failed {
            category, message, ..
        } => Err(format!("{} failed: {}", category, message).into()),
        other => Ok(other),
    }
}

fn task_not_found(id: &str) -> Box<dyn Error> {
    format!("task not found: {}", id).into()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Answers the interaction prompts from command-line flags and stdin
struct CliPrompt {
    text: Option<String>,
    deadline: Option<String>,
    assume_yes: bool,
    quiet: bool,
}

impl CliPrompt {
    fn new(json: bool) -> Self {
        CliPrompt {
            text: None,
            deadline: None,
            assume_yes: false,
            quiet: json,
        }
    }
}

impl Interaction for CliPrompt {
    fn prompt_create(&mut self) -> Option<TaskInput> {
        TaskInput::new(self.text.take()?, self.deadline.take()?)
    }

    fn prompt_edit(&mut self, text: &str, deadline: &str) -> Option<TaskInput> {
        let text = self.text.take().unwrap_or_else(|| text.to_string());
        let deadline = self.deadline.take().unwrap_or_else(|| deadline.to_string());
        TaskInput::new(text, deadline)
    }

    fn confirm_destroy(&mut self) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("Yakin ingin menghapus tugas ini? [y/n] ");
        let _ = io::stderr().flush();
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        input.trim().eq_ignore_ascii_case("y")
    }

    fn notify(&mut self, notice: Notice) {
        if self.quiet {
            return;
        }
        match notice.kind {
            NoticeKind::Success => println!("{}", notice.message),
            NoticeKind::Error => eprintln!("{}", notice.message),
        }
    }
}

// ---------------------------------------------------------------------------
// Read handlers
// ---------------------------------------------------------------------------

fn cmd_list(project_dir: Option<&str>, args: ListArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let session = Session::open(project_dir)?;
    let store = session.load_tasks()?;

    let key = match args.sort.as_deref() {
        Some(s) => SortKey::parse_key(s).ok_or_else(|| {
            format!("unknown sort \"{}\" (expected insertion, name or remaining)", s)
        })?,
        None => session.project.config.ui.sort,
    };
    let pattern = args
        .pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| format!("invalid regex: {}", e))?;

    let now = now_millis();
    let mut view = sorted_view(store.tasks(), key, now);
    if let Some(re) = &pattern {
        view.retain(|t| re.is_match(&t.text));
    }

    if json {
        return print_json(&TaskListJson {
            sort: key.to_string(),
            tasks: view.iter().map(|t| task_to_json(t, now)).collect(),
        });
    }

    if view.is_empty() {
        println!("{}", EMPTY_LIST);
        return Ok(());
    }
    for line in format_task_table(&view, now) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write handlers
// ---------------------------------------------------------------------------

fn cmd_add(project_dir: Option<&str>, args: AddArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let session = Session::open(project_dir)?;
    let mut store = TaskStore::with_journal(&session.project.dir);
    let mut prompt = CliPrompt {
        text: Some(args.text),
        deadline: Some(args.deadline),
        ..CliPrompt::new(json)
    };

    let outcome = interact::add_task(&mut store, session.remote.as_ref(), &mut prompt)?
        .ok_or("task text and deadline must not be empty")?;
    let Outcome::Added { id } = check(outcome)? else {
        return Ok(());
    };

    if let Some(task) = store.get(&id) {
        if json {
            print_json(&task_to_json(task, now_millis()))?;
        } else {
            println!("{}", format_task_line(task, now_millis()));
        }
    }
    Ok(())
}

fn cmd_edit(project_dir: Option<&str>, args: EditArgs, json: bool) -> Result<(), Box<dyn Error>> {
    if args.text.is_none() && args.deadline.is_none() {
        return Err("nothing to change: pass --text and/or --deadline".into());
    }
    let session = Session::open(project_dir)?;
    let mut store = session.load_tasks()?;
    if store.get(&args.id).is_none() {
        return Err(task_not_found(&args.id));
    }

    let mut prompt = CliPrompt {
        text: args.text,
        deadline: args.deadline,
        ..CliPrompt::new(json)
    };
    let outcome = interact::edit_task(&mut store, session.remote.as_ref(), &mut prompt, &args.id)?
        .ok_or("task text and deadline must not be empty")?;
    check(outcome)?;

    if json && let Some(task) = store.get(&args.id) {
        print_json(&task_to_json(task, now_millis()))?;
    }
    Ok(())
}

fn cmd_toggle(
    project_dir: Option<&str>,
    args: ToggleArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let session = Session::open(project_dir)?;
    let mut store = session.load_tasks()?;
    let outcome = interact::toggle_task(&mut store, session.remote.as_ref(), &args.id)
        .ok_or_else(|| task_not_found(&args.id))?;
    check(outcome)?;

    if let Some(task) = store.get(&args.id) {
        if json {
            print_json(&task_to_json(task, now_millis()))?;
        } else {
            println!("{}", format_task_line(task, now_millis()));
        }
    }
    Ok(())
}

fn cmd_rm(project_dir: Option<&str>, args: RmArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let session = Session::open(project_dir)?;
    let mut store = session.load_tasks()?;
    if store.get(&args.id).is_none() {
        return Err(task_not_found(&args.id));
    }

    let mut prompt = CliPrompt {
        assume_yes: args.yes,
        ..CliPrompt::new(json)
    };
    let Some(outcome) =
        interact::delete_task(&mut store, session.remote.as_ref(), &mut prompt, &args.id)
    else {
        if !json {
            println!("cancelled");
        }
        return Ok(());
    };
    check(outcome)?;

    if json {
        print_json(&serde_json::json!({ "id": args.id, "deleted": true }))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sync log and config
// ---------------------------------------------------------------------------

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, Box<dyn Error>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(|e| format!("invalid timestamp '{}': {}", s, e))?
        .with_timezone(&Utc))
}

fn cmd_log(project_dir: Option<&str>, args: LogCmd, json: bool) -> Result<(), Box<dyn Error>> {
    let project = load_project_from(project_dir)?;

    match args.action {
        Some(LogAction::Path) => {
            println!("{}", sync_log::sync_log_path(&project.dir).display());
            Ok(())
        }
        Some(LogAction::Prune(prune)) => {
            let before = prune.before.as_deref().map(parse_timestamp).transpose()?;
            let removed = sync_log::prune_sync_log(&project.dir, before, prune.all)?;
            if json {
                print_json(&serde_json::json!({ "pruned": removed }))?;
            } else {
                println!("pruned {} entries", removed);
            }
            Ok(())
        }
        None => {
            let since = args.since.as_deref().map(parse_timestamp).transpose()?;
            let limit = args.limit.unwrap_or(10);
            let entries = sync_log::read_sync_entries(&project.dir, Some(limit), since);

            if json {
                let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                return print_json(&values);
            }
            if entries.is_empty() {
                println!("sync log is empty");
                return Ok(());
            }
            for entry in &entries {
                for line in format_sync_entry(entry) {
                    println!("{}", line);
                }
            }
            if let Some(summary) = sync_log::sync_summary(&project.dir)
                && summary.entry_count > entries.len()
            {
                println!(
                    "({} of {} entries shown; use --limit for more)",
                    entries.len(),
                    summary.entry_count
                );
            }
            Ok(())
        }
    }
}

fn cmd_config(project_dir: Option<&str>, args: ConfigCmd) -> Result<(), Box<dyn Error>> {
    let project = load_project_from(project_dir)?;
    let (_config, mut doc) = config_io::read_config(&project.dir)?;

    match args.action {
        ConfigAction::Backend { value } => {
            let backend = Backend::parse_backend(&value).ok_or_else(|| {
                format!("unknown backend \"{}\" (expected file, memory or firestore)", value)
            })?;
            config_io::set_backend(&mut doc, backend);
            println!("backend = {}", backend);
        }
        ConfigAction::Sort { value } => {
            let key = SortKey::parse_key(&value).ok_or_else(|| {
                format!("unknown sort \"{}\" (expected insertion, name or remaining)", value)
            })?;
            config_io::set_sort(&mut doc, key);
            println!("sort = {}", key);
        }
    }

    config_io::write_config(&project.dir, &doc)?;
    Ok(())
}
