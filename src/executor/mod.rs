//! Sequential task execution engine.
//!
//! The engine is strictly single-threaded and synchronous: one play at a
//! time, one block at a time, one task at a time, halting a play on the
//! first failed task. Fan-out across hosts belongs to the caller, one
//! session per host.

pub mod play;
pub mod task;

pub use play::PlayRunner;
pub use task::{RawResult, ResultExt, TaskReport, TaskRunner};

use indexmap::IndexMap;

use crate::playbook::Play;
use crate::session::SessionOptions;

/// Play-scoped execution settings, built fresh per play invocation.
///
/// The task runner forwards this to the execution backend unchanged; the
/// core never interprets connection or privilege settings itself.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Name of the play this context belongs to
    pub play_name: String,

    /// Dry-run mode
    pub check_mode: bool,

    /// Diff reporting mode
    pub diff_mode: bool,

    /// Privilege escalation
    pub r#become: bool,
    pub become_user: Option<String>,

    /// Connection hint from the play
    pub connection: Option<String>,

    /// Environment variables for task execution
    pub environment: IndexMap<String, String>,
}

impl ExecutionContext {
    /// Builds a context for one play, with play settings overriding the
    /// session's defaults.
    pub fn for_play(play: &Play, options: &SessionOptions) -> Self {
        Self {
            play_name: play.name.clone(),
            check_mode: options.check_mode,
            diff_mode: options.diff_mode,
            r#become: play.r#become.unwrap_or(options.r#become),
            become_user: play
                .become_user
                .clone()
                .or_else(|| options.become_user.clone()),
            connection: play.connection.clone(),
            environment: play.environment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_play_overrides_session_defaults() {
        let mut play = Play::new("escalated");
        play.r#become = Some(true);
        play.become_user = Some("deploy".to_string());

        let options = SessionOptions {
            check_mode: true,
            ..Default::default()
        };

        let ctx = ExecutionContext::for_play(&play, &options);
        assert!(ctx.check_mode);
        assert!(ctx.r#become);
        assert_eq!(ctx.become_user.as_deref(), Some("deploy"));
    }

    #[test]
    fn test_context_falls_back_to_session_become() {
        let play = Play::new("plain");
        let options = SessionOptions {
            r#become: true,
            become_user: Some("root".to_string()),
            ..Default::default()
        };

        let ctx = ExecutionContext::for_play(&play, &options);
        assert!(ctx.r#become);
        assert_eq!(ctx.become_user.as_deref(), Some("root"));
    }
}
