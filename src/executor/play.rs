//! Play execution.
//!
//! A play runs its blocks in order and its tasks in order within each
//! block. The first failed task halts the whole play, not just its block;
//! results accumulated up to and including the failing task are returned.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::executor::{ExecutionContext, TaskRunner};
use crate::playbook::Play;
use crate::session::RuntimeSession;

/// Executes plays against the session's host.
pub struct PlayRunner<'a> {
    session: &'a RuntimeSession,
}

impl<'a> PlayRunner<'a> {
    pub fn new(session: &'a RuntimeSession) -> Self {
        Self { session }
    }

    /// Runs one play, layering `task_vars` over the play scope.
    ///
    /// Scope chain: session vars, then play vars, then `task_vars`, then a
    /// per-task layer for each task's own vars. Each per-task layer lives
    /// only for its task's run call.
    pub fn run_play(
        &self,
        play: &Play,
        task_vars: &IndexMap<String, Value>,
    ) -> Result<Vec<Value>> {
        debug!(
            "Running play '{}' ({} tasks)",
            play.name,
            play.task_count()
        );

        let play_scope = self.session.vars().push_child(play.vars.clone());
        let run_scope = play_scope.push_child(task_vars.clone());
        let ctx = ExecutionContext::for_play(play, self.session.options());
        let runner = TaskRunner::new(self.session);

        let mut results = Vec::new();

        'blocks: for block in &play.blocks {
            for task in &block.tasks {
                let scope = run_scope.push_child(task.vars.clone());
                let report = runner.run_task(task, &scope, &ctx)?;
                let failed = report.failed;
                results.push(report.value);

                if failed {
                    warn!(
                        "Task: <{}> using module -->{} failed, exiting.",
                        task.name, task.action
                    );
                    break 'blocks;
                }
            }
        }

        Ok(results)
    }
}
