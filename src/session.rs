//! Runtime session: the owning context for one host's playbook runs.
//!
//! A session binds exactly one host for its lifetime and owns the loader,
//! the execution backend, the formatter registry, the base variable stack,
//! and the currently loaded plays. Loading a playbook replaces the plays
//! wholesale but only ever extends the variables. Sessions are
//! single-threaded; callers fanning out across hosts create one session
//! per host with no shared mutable state between them.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::backend::{ExecutionBackend, ModuleBackend};
use crate::error::Result;
use crate::executor::PlayRunner;
use crate::formatter::{Formatter, FormatterRegistry};
use crate::host::Host;
use crate::loader::{Loader, YamlLoader};
use crate::playbook::Play;
use crate::vars::VarStack;

/// Session-level execution defaults, typically fed from CLI options.
///
/// Play-level settings override these per play.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Dry-run mode
    pub check_mode: bool,
    /// Diff reporting mode
    pub diff_mode: bool,
    /// Privilege escalation default
    pub r#become: bool,
    /// Default user to become
    pub become_user: Option<String>,
}

/// The runtime environment for running playbooks against one host.
pub struct RuntimeSession {
    host: Host,
    options: SessionOptions,
    loader: Box<dyn Loader>,
    backend: Box<dyn ExecutionBackend>,
    formatters: FormatterRegistry,
    vars: VarStack,
    plays: Vec<Play>,
}

impl RuntimeSession {
    /// Creates a session bound to `host`, with the YAML loader, the
    /// in-process module backend, and an empty variable base.
    pub fn new(host: Host) -> Self {
        Self {
            host,
            options: SessionOptions::default(),
            loader: Box::new(YamlLoader::new()),
            backend: Box::new(ModuleBackend::with_builtins()),
            formatters: FormatterRegistry::new(),
            vars: VarStack::new(),
            plays: Vec::new(),
        }
    }

    /// Sets the session options.
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the playbook loader.
    pub fn with_loader(mut self, loader: Box<dyn Loader>) -> Self {
        self.loader = loader;
        self
    }

    /// Replaces the execution backend.
    pub fn with_backend(mut self, backend: Box<dyn ExecutionBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Registers a result formatter for a module name.
    pub fn with_formatter(mut self, module: impl Into<String>, formatter: Formatter) -> Self {
        self.formatters.register(module, formatter);
        self
    }

    /// Seeds the base variable layer. Intended for session construction;
    /// later additions go through `load_playbook`.
    pub fn with_initial_vars(mut self, vars: IndexMap<String, Value>) -> Self {
        self.vars.extend(vars);
        self
    }

    /// Returns the bound host.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Returns the session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Returns the execution backend.
    pub fn backend(&self) -> &dyn ExecutionBackend {
        self.backend.as_ref()
    }

    /// Returns the formatter registry.
    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    /// Returns the session's variable stack.
    pub fn vars(&self) -> &VarStack {
        &self.vars
    }

    /// Returns the currently loaded plays.
    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    /// Loads a playbook from source text, replacing any previously loaded
    /// plays and layering `initial_vars` over the session variables.
    ///
    /// Returns the number of plays loaded. Variables are never discarded by
    /// a reload: prior keys stay visible, new ones are added or shadow.
    pub fn load_playbook(
        &mut self,
        source: &str,
        initial_vars: IndexMap<String, Value>,
    ) -> Result<usize> {
        let plays = self.loader.load(source)?;
        for play in &plays {
            play.validate()?;
            debug!("Loading play: {}", play.name);
        }

        // Out with the old, in with the new.
        self.plays = plays;
        self.vars.extend(initial_vars);
        Ok(self.plays.len())
    }

    /// Runs every loaded play in order, concatenating the per-play result
    /// lists into one ordered list keyed by the host name.
    ///
    /// `task_vars` are layered over each play's scope for the duration of
    /// the run and go out of scope when it returns.
    pub fn run_all(
        &self,
        task_vars: &IndexMap<String, Value>,
    ) -> Result<IndexMap<String, Vec<Value>>> {
        info!(
            "Running {} play(s) on host: {}",
            self.plays.len(),
            self.host
        );

        let runner = PlayRunner::new(self);
        let mut results = Vec::new();
        for play in &self.plays {
            results.extend(runner.run_play(play, task_vars)?);
        }

        let mut keyed = IndexMap::new();
        keyed.insert(self.host.name().to_string(), results);
        Ok(keyed)
    }

    /// Runs a single play. Allows callers to execute specific plays with
    /// play-level variable overrides.
    pub fn run_play(
        &self,
        play: &Play,
        task_vars: &IndexMap<String, Value>,
    ) -> Result<Vec<Value>> {
        PlayRunner::new(self).run_play(play, task_vars)
    }
}

impl std::fmt::Debug for RuntimeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeSession")
            .field("host", &self.host)
            .field("options", &self.options)
            .field("plays", &self.plays.len())
            .field("vars_depth", &self.vars.depth())
            .finish()
    }
}
