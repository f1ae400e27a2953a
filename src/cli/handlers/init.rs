use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::project_io::{self, CONFIG_FILE, PROJECT_DIR};
use crate::model::config::Backend;

const CONFIG_TEMPLATE: &str = r##"[store]
# Where tasks are kept: "file" (todoliez/tasks.json), "memory" (gone on exit)
# or "firestore" (hosted, configure below)
backend = "{backend}"

# [store.firestore]
# project_id = "my-project"
# api_key = "..."
# endpoint = "https://firestore.googleapis.com/v1"
# database = "(default)"
# timeout_secs = 10

[ui]
# Initial order of the list: "insertion", "name" or "remaining"
sort = "insertion"

# [ui.colors]
# background = "#1A1B26"
# text = "#C0CAF5"
# text_bright = "#FFFFFF"
# highlight = "#7AA2F7"
# dim = "#565F89"
# red = "#F7768E"
# green = "#9ECE6A"
# yellow = "#E0AF68"

[log]
# tracing filter for todoliez/todoliez.log; RUST_LOG takes precedence
level = "info"
"##;

/// Ignored by version control: machine-local files inside todoliez/
const GITIGNORE: &str = ".lock\n.state.json\n.sync.log\ntodoliez.log\n";

fn render_config(backend: Backend) -> String {
    CONFIG_TEMPLATE.replace("{backend}", &backend.to_string())
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let dir = cwd.join(PROJECT_DIR);

    if dir.join(CONFIG_FILE).exists() && !args.force {
        return Err("todoliez project already exists in ./todoliez/ (use --force to overwrite the config)".into());
    }

    let backend = match args.backend.as_deref() {
        Some(s) => Backend::parse_backend(s)
            .ok_or_else(|| format!("unknown backend \"{}\" (expected file, memory or firestore)", s))?,
        None => Backend::default(),
    };

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = project_io::discover_project(parent)
    {
        eprintln!(
            "Note: parent project found at {}/",
            parent_root.join(PROJECT_DIR).display()
        );
        eprintln!("Creating new project in ./todoliez/");
    }

    fs::create_dir_all(&dir)?;
    fs::write(dir.join(CONFIG_FILE), render_config(backend))?;
    fs::write(dir.join(".gitignore"), GITIGNORE)?;

    println!("Initialized todoliez project ({} backend)", backend);
    if backend == Backend::Firestore {
        println!("  fill in [store.firestore] in todoliez/config.toml before running tdl");
    }
    Ok(())
}
