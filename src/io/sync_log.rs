use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::io::lock::FileLock;

/// Size past which old entries are trimmed on the next append (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Entries older than this many days are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Separator between timestamp and category in an entry header.
const HEADER_SEP: &str = " | ";

const FILE_HEADER: &str = "\
<!-- todoliez sync log: remote operations that failed.
     The local task list kept going without them; the store may differ
     until the next reload.
     View with: tdl log
     Prune old entries: tdl log prune -->

---
";

/// Which remote operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCategory {
    Load,
    Create,
    Update,
    Toggle,
    Delete,
}

impl fmt::Display for SyncCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncCategory::Load => write!(f, "load"),
            SyncCategory::Create => write!(f, "create"),
            SyncCategory::Update => write!(f, "update"),
            SyncCategory::Toggle => write!(f, "toggle"),
            SyncCategory::Delete => write!(f, "delete"),
        }
    }
}

impl SyncCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "load" => Some(SyncCategory::Load),
            "create" => Some(SyncCategory::Create),
            "update" => Some(SyncCategory::Update),
            "toggle" => Some(SyncCategory::Toggle),
            "delete" => Some(SyncCategory::Delete),
            _ => None,
        }
    }
}

/// One failed remote operation
#[derive(Debug, Clone)]
pub struct SyncEntry {
    pub timestamp: DateTime<Utc>,
    pub category: SyncCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    /// What the operation tried to write, as JSON
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub entry_count: usize,
    pub oldest: Option<DateTime<Utc>>,
}

pub fn sync_log_path(dir: &Path) -> PathBuf {
    dir.join(".sync.log")
}

impl SyncEntry {
    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {}{}{}: {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            HEADER_SEP,
            self.category,
            self.description,
        );
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        if !self.body.is_empty() {
            out.push_str("\n```json\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }
        out.push_str("\n---\n");
        out
    }

    /// JSON form for `tdl log --json`
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

/// Append an entry. Write failures go to the tracing log and are otherwise ignored.
pub fn log_sync_failure(dir: &Path, entry: SyncEntry) {
    if let Err(e) = append(dir, &entry) {
        tracing::error!(error = %e, "could not write to sync log");
    }
}

fn append(dir: &Path, entry: &SyncEntry) -> io::Result<()> {
    let path = sync_log_path(dir);

    if let Ok(meta) = fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        let content = fs::read_to_string(&path)?;
        let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
        let trimmed = prune_entries_before(&content, &cutoff);
        if trimmed.len() < content.len() {
            fs::write(&path, trimmed)?;
        }
    }

    let needs_header = fs::metadata(&path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Entries, most recent first. `limit` keeps the newest n.
pub fn read_sync_entries(
    dir: &Path,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<SyncEntry> {
    let content = match fs::read_to_string(sync_log_path(dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };
    let mut entries = parse_entries(&content);
    if let Some(since) = since {
        entries.retain(|e| e.timestamp >= since);
    }
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }
    entries.reverse();
    entries
}

pub fn sync_summary(dir: &Path) -> Option<SyncSummary> {
    let content = fs::read_to_string(sync_log_path(dir)).ok()?;
    let entries = parse_entries(&content);
    if entries.is_empty() {
        return None;
    }
    Some(SyncSummary {
        entry_count: entries.len(),
        oldest: entries.first().map(|e| e.timestamp),
    })
}

/// Remove entries older than `before` (default 30 days), or all of them.
/// Returns how many were removed.
pub fn prune_sync_log(
    dir: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let path = sync_log_path(dir);
    if !path.exists() {
        return Ok(0);
    }
    let _lock = FileLock::acquire(dir, Duration::from_secs(1))?;
    let content = fs::read_to_string(&path)?;
    let original = parse_entries(&content).len();

    if all {
        fs::write(&path, FILE_HEADER)?;
        return Ok(original);
    }

    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let trimmed = prune_entries_before(&content, &cutoff);
    let remaining = parse_entries(&trimmed).len();
    fs::write(&path, &trimmed)?;
    Ok(original - remaining)
}

fn parse_entries(content: &str) -> Vec<SyncEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if in_code_block {
                if line.starts_with("```") {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }
            if line == "---" {
                break;
            }
            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }
            if let Some((key, value)) = line.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(SyncEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }
    entries
}

/// `<timestamp> | <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, SyncCategory, String)> {
    let (ts, rest) = header.split_once(HEADER_SEP)?;
    let timestamp = DateTime::parse_from_rfc3339(ts).ok()?.with_timezone(&Utc);
    let (category, description) = rest.split_once(": ")?;
    let category = SyncCategory::parse_category(category)?;
    Some((timestamp, category, description.to_string()))
}

/// Drop entries stamped before `cutoff`, keeping the file header.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut result = String::new();
    let mut current = String::new();
    let mut current_ts: Option<DateTime<Utc>> = None;
    let mut in_header = true;

    for line in content.lines() {
        if in_header {
            result.push_str(line);
            result.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }
        if let Some(stripped) = line.strip_prefix("## ") {
            if let Some(ts) = current_ts
                && ts >= *cutoff
            {
                result.push_str(&current);
            }
            current.clear();
            current_ts = parse_entry_header(stripped).map(|(ts, _, _)| ts);
        }
        current.push_str(line);
        current.push('\n');
    }
    if let Some(ts) = current_ts
        && ts >= *cutoff
    {
        result.push_str(&current);
    }
    result
}
