//! Playlet - single-host playbook runner
//!
//! This is the main entry point for the Playlet CLI. It is glue around the
//! library core: read the playbook file, run it, write the results to a
//! JSON file, and print a recap.

mod cli;

use anyhow::Context;
use indexmap::IndexMap;
use serde_json::Value;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use playlet::host::Host;
use playlet::output;
use playlet::session::RuntimeSession;

fn main() {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            output::error(&format!("{:#}", e));
            let code = e
                .downcast_ref::<playlet::error::Error>()
                .map(playlet::error::Error::exit_code)
                .unwrap_or(1);
            std::process::exit(code);
        }
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let source = std::fs::read_to_string(&cli.playbook)
        .with_context(|| format!("reading playbook '{}'", cli.playbook.display()))?;
    let extra_vars = cli::parse_extra_vars(&cli.extra_vars)?;

    let mut session =
        RuntimeSession::new(Host::new(&cli.host)).with_options(cli.session_options());
    session.load_playbook(&source, extra_vars)?;

    output::run_header(&cli.host, &cli.playbook.display().to_string());
    let results = session.run_all(&IndexMap::new())?;

    let basename = cli
        .playbook
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "playbook".to_string());
    let fname = format!("{}_{}_.json", cli.host, basename);
    let path = cli.output_dir.join(&fname);
    std::fs::write(&path, serde_json::to_string_pretty(&results)?)
        .with_context(|| format!("writing results to '{}'", path.display()))?;

    let mut exit_code = 0;
    for (host, host_results) in &results {
        let mut fail_count = 0;
        let mut changed_count = 0;

        for result in host_results {
            let failed = truthy(&result["result"]["failed"]);
            let changed = truthy(&result["result"]["changed"]);
            if failed {
                fail_count += 1;
            }
            if changed {
                changed_count += 1;
            }

            let taskname = result["invocation"]["taskname"]
                .as_str()
                .unwrap_or("<task>");
            output::task_line(host, taskname, failed, changed);
        }

        output::recap(
            host,
            host_results.len(),
            fail_count,
            changed_count,
            &path.display().to_string(),
        );

        if fail_count > 0 {
            exit_code = 2;
        }
    }

    Ok(exit_code)
}

/// Truthiness of a flag field in an emitted result.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::String(s) => !s.is_empty() && s != "false",
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => true,
    }
}
