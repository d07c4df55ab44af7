//! # Playlet - Single-Host Playbook Execution
//!
//! Playlet executes a declarative playbook (an ordered list of plays, each
//! containing ordered task blocks) against a single target host and returns
//! a structured, JSON-serializable result per task. A play's task stream
//! stops on the first failure.
//!
//! Playlet is deliberately a *core*, not an orchestrator: it does no
//! multi-host coordination, no process or thread fan-out, no inventory
//! management, and no connection handling. A caller that wants any of those
//! creates one session per host, runs them however it likes, and aggregates
//! the per-host result lists itself.
//!
//! ## Core Concepts
//!
//! - **Playbooks**: ordered plays, loaded once per `load_playbook` call
//! - **Plays**: named, ordered groups of task blocks targeting a host
//! - **Tasks**: units of work naming a module and its parameters
//! - **Variable stack**: chained immutable scopes; child layers shadow
//!   parents and vanish when their owning call returns
//! - **Modules**: string-keyed handlers performing the actual work
//! - **Formatters**: per-module reshaping of raw results before emission
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Runtime Session                     │
//! │     (host binding, loader, base vars, loaded plays)     │
//! └─────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Play Runner                       │
//! │       (scope layering, fail-fast block iteration)       │
//! └─────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Task Runner                       │
//! │      (backend call, error absorption, formatting)       │
//! └─────────────────────────────────────────────────────────┘
//!              │                              │
//!              ▼                              ▼
//! ┌─────────────────────────┐   ┌─────────────────────────┐
//! │    Execution Backend    │   │   Formatter Registry    │
//! │  (module dispatch, or   │   │  (per-module emitters,  │
//! │   caller-supplied)      │   │   default fallback)     │
//! └─────────────────────────┘   └─────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use playlet::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut session = RuntimeSession::new(Host::new("web01"));
//!     let source = std::fs::read_to_string("site.yml")?;
//!     let play_count = session.load_playbook(&source, Default::default())?;
//!     println!("loaded {} plays", play_count);
//!
//!     let results = session.run_all(&Default::default())?;
//!     println!("{}", serde_json::to_string_pretty(&results)?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::backend::{BackendError, BackendResult, ExecutionBackend, ModuleBackend};
    pub use crate::error::{Error, Result};
    pub use crate::executor::{ExecutionContext, RawResult, ResultExt, TaskReport};
    pub use crate::formatter::{Formatter, FormatterRegistry};
    pub use crate::host::Host;
    pub use crate::loader::{Loader, YamlLoader};
    pub use crate::modules::{Module, ModuleOutput, ModuleRegistry};
    pub use crate::playbook::{Play, Task, TaskBlock};
    pub use crate::session::{RuntimeSession, SessionOptions};
    pub use crate::vars::VarStack;
}

/// Error types and result alias.
pub mod error;

/// Target host descriptor.
pub mod host;

/// Layered variable scopes.
pub mod vars;

/// Playbook data model (plays, blocks, tasks).
pub mod playbook;

/// Playbook loading collaborators.
pub mod loader;

/// Result formatting dispatch.
///
/// Maps a task's module identifier to a formatter callable; modules without
/// one go through the default `{invocation, result}` reshaping.
pub mod formatter;

/// Execution backends: the boundary to module execution machinery.
pub mod backend;

/// Built-in module implementations and the module registry.
pub mod modules;

/// The sequential play/task execution engine.
pub mod executor;

/// The runtime session owning one host's playbook runs.
pub mod session;

/// Colored terminal reporting for the CLI.
pub mod output;

/// Returns the current version of Playlet.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
