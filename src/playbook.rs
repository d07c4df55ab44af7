//! Playbook data model.
//!
//! A playbook is an ordered list of plays; a play is an ordered list of
//! task blocks; a block is an ordered list of tasks. The types here are the
//! already-parsed objects the execution engine consumes. In YAML form a
//! task names its module as a key, either with a parameter mapping or a
//! bare command string:
//!
//! ```yaml
//! - name: Provision
//!   hosts: web01
//!   vars:
//!     greeting: hello
//!   tasks:
//!     - name: Say hello
//!       debug:
//!         msg: "{{ greeting }}"
//!     - name: Grouped steps
//!       block:
//!         - name: Touch marker
//!           command: touch /tmp/marker
//! ```
//!
//! Consecutive plain tasks are grouped into one implicit block; an entry
//! with a `block:` key becomes its own named block.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Task entry keys that do not name a module.
const RESERVED_TASK_KEYS: &[&str] = &["name", "vars", "block"];

/// A play: a named, ordered group of task blocks targeting a host.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawPlay")]
pub struct Play {
    /// Name of the play
    pub name: String,

    /// Informational host pattern from the playbook source. The session's
    /// host binding decides where tasks actually run.
    pub hosts: Option<String>,

    /// Play-level variables, layered over the session's base variables
    pub vars: IndexMap<String, Value>,

    /// Ordered task blocks
    pub blocks: Vec<TaskBlock>,

    /// Privilege escalation settings, forwarded opaquely to the backend
    pub r#become: Option<bool>,
    pub become_user: Option<String>,

    /// Connection hint, forwarded opaquely to the backend
    pub connection: Option<String>,

    /// Environment variables for task execution
    pub environment: IndexMap<String, String>,
}

impl Play {
    /// Creates an empty play with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: None,
            vars: IndexMap::new(),
            blocks: Vec::new(),
            r#become: None,
            become_user: None,
            connection: None,
            environment: IndexMap::new(),
        }
    }

    /// Appends a task block.
    pub fn with_block(mut self, block: TaskBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Appends a single task as its own implicit block.
    pub fn with_task(mut self, task: Task) -> Self {
        self.blocks.push(TaskBlock::implicit(vec![task]));
        self
    }

    /// Sets a play-level variable.
    pub fn with_var(mut self, key: impl Into<String>, value: Value) -> Self {
        self.vars.insert(key.into(), value);
        self
    }

    /// Validates the play structure.
    pub fn validate(&self) -> Result<()> {
        for block in &self.blocks {
            for task in &block.tasks {
                task.validate()?;
            }
        }
        Ok(())
    }

    /// Returns the total number of tasks across all blocks.
    pub fn task_count(&self) -> usize {
        self.blocks.iter().map(|b| b.tasks.len()).sum()
    }
}

/// An ordered group of tasks executed as one unit within a play.
#[derive(Debug, Clone)]
pub struct TaskBlock {
    /// Block name, if the playbook named it
    pub name: Option<String>,

    /// Ordered tasks
    pub tasks: Vec<Task>,
}

impl TaskBlock {
    /// Creates a named block.
    pub fn new(name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            name: Some(name.into()),
            tasks,
        }
    }

    /// Creates an unnamed block, as used for loose task grouping.
    pub fn implicit(tasks: Vec<Task>) -> Self {
        Self { name: None, tasks }
    }
}

/// A single unit of work naming a module and its parameters.
#[derive(Debug, Clone)]
pub struct Task {
    /// Human-readable task name
    pub name: String,

    /// Module identifier to dispatch on
    pub action: String,

    /// Module parameters (always a JSON object)
    pub args: Value,

    /// Task-level variables, layered over the play scope for this task only
    pub vars: IndexMap<String, Value>,
}

impl Task {
    /// Creates a new task.
    pub fn new(name: impl Into<String>, action: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            args,
            vars: IndexMap::new(),
        }
    }

    /// Sets a task-level variable.
    pub fn with_var(mut self, key: impl Into<String>, value: Value) -> Self {
        self.vars.insert(key.into(), value);
        self
    }

    /// Validates the task.
    pub fn validate(&self) -> Result<()> {
        if self.action.is_empty() {
            return Err(Error::PlaybookValidation(format!(
                "task '{}' does not name a module",
                self.name
            )));
        }
        if !self.args.is_object() {
            return Err(Error::PlaybookValidation(format!(
                "task '{}' has non-mapping arguments",
                self.name
            )));
        }
        Ok(())
    }
}

/// Builds a task from a raw YAML mapping.
///
/// The first non-reserved key names the module; its value is either a
/// parameter mapping, a bare command string (stored as `cmd`), or null.
fn task_from_map<E: de::Error>(map: IndexMap<String, Value>) -> std::result::Result<Task, E> {
    let mut name = String::new();
    let mut vars = IndexMap::new();
    let mut module: Option<(String, Value)> = None;

    for (key, value) in map {
        match key.as_str() {
            "name" => {
                name = value
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| E::custom("task 'name' must be a string"))?;
            }
            "vars" => {
                vars = vars_from_value(value)
                    .map_err(|msg| E::custom(format!("task 'vars' {}", msg)))?;
            }
            "block" => {
                return Err(E::custom("nested blocks are not supported"));
            }
            _ => {
                if let Some((first, _)) = &module {
                    return Err(E::custom(format!(
                        "task names multiple modules: '{}' and '{}'",
                        first, key
                    )));
                }
                let args = match value {
                    Value::Object(_) => value,
                    Value::String(cmd) => serde_json::json!({ "cmd": cmd }),
                    Value::Null => Value::Object(serde_json::Map::new()),
                    other => {
                        return Err(E::custom(format!(
                            "arguments for module '{}' must be a mapping or string, got {}",
                            key, other
                        )))
                    }
                };
                module = Some((key, args));
            }
        }
    }

    let (action, args) =
        module.ok_or_else(|| E::custom(format!("task '{}' names no module", name)))?;

    Ok(Task {
        name,
        action,
        args,
        vars,
    })
}

fn vars_from_value(value: Value) -> std::result::Result<IndexMap<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(IndexMap::new()),
        _ => Err("must be a mapping".to_string()),
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = IndexMap::<String, Value>::deserialize(deserializer)?;
        task_from_map::<D::Error>(map)
    }
}

/// A task-list entry: either a plain task or an explicit block.
#[derive(Debug, Clone)]
enum TaskEntry {
    Task(Task),
    Block(TaskBlock),
}

impl<'de> Deserialize<'de> for TaskEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = IndexMap::<String, Value>::deserialize(deserializer)?;

        if let Some(block_value) = map.shift_remove("block") {
            let name = match map.shift_remove("name") {
                Some(Value::String(s)) => Some(s),
                Some(_) => return Err(de::Error::custom("block 'name' must be a string")),
                None => None,
            };
            for key in map.keys() {
                if !RESERVED_TASK_KEYS.contains(&key.as_str()) {
                    return Err(de::Error::custom(format!(
                        "block entry cannot also name module '{}'",
                        key
                    )));
                }
            }
            let tasks: Vec<Task> =
                serde_json::from_value(block_value).map_err(de::Error::custom)?;
            return Ok(TaskEntry::Block(TaskBlock { name, tasks }));
        }

        Ok(TaskEntry::Task(task_from_map::<D::Error>(map)?))
    }
}

/// Raw play shape as it appears in playbook YAML.
#[derive(Debug, Deserialize)]
struct RawPlay {
    #[serde(default)]
    name: String,

    #[serde(default)]
    hosts: Option<String>,

    #[serde(default)]
    vars: IndexMap<String, Value>,

    #[serde(default)]
    tasks: Vec<TaskEntry>,

    #[serde(default, rename = "become")]
    become_: Option<bool>,

    #[serde(default)]
    become_user: Option<String>,

    #[serde(default)]
    connection: Option<String>,

    #[serde(default)]
    environment: IndexMap<String, String>,
}

impl From<RawPlay> for Play {
    fn from(raw: RawPlay) -> Self {
        // Group consecutive loose tasks into one implicit block; explicit
        // blocks keep their own identity and ordering.
        let mut blocks = Vec::new();
        let mut pending: Vec<Task> = Vec::new();

        for entry in raw.tasks {
            match entry {
                TaskEntry::Task(task) => pending.push(task),
                TaskEntry::Block(block) => {
                    if !pending.is_empty() {
                        blocks.push(TaskBlock::implicit(std::mem::take(&mut pending)));
                    }
                    blocks.push(block);
                }
            }
        }
        if !pending.is_empty() {
            blocks.push(TaskBlock::implicit(pending));
        }

        Self {
            name: raw.name,
            hosts: raw.hosts,
            vars: raw.vars,
            blocks,
            r#become: raw.become_,
            become_user: raw.become_user,
            connection: raw.connection,
            environment: raw.environment,
        }
    }
}
