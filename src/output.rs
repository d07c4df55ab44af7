//! Output and reporting for the Playlet CLI

use colored::Colorize;

/// Print a run header
pub fn run_header(host: &str, playbook: &str) {
    let header = format!("RUN [{} <- {}]", host, playbook);
    let stars = "*".repeat(80_usize.saturating_sub(header.len()));
    println!("\n{} {}", header.bright_white().bold(), stars.bright_black());
}

/// Print a per-task status line
pub fn task_line(host: &str, taskname: &str, failed: bool, changed: bool) {
    let status = if failed {
        "failed".red().bold()
    } else if changed {
        "changed".yellow()
    } else {
        "ok".green()
    };
    println!("{}: [{}] => {}", status, host.bright_white().bold(), taskname);
}

/// Print an error line
pub fn error(msg: &str) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print the run recap for one host
pub fn recap(host: &str, tasks: usize, failed: usize, changed: usize, file: &str) {
    println!(
        "\n{} {}",
        "RUN RECAP".bright_white().bold(),
        "*".repeat(70).bright_black()
    );

    let host_colored = if failed > 0 {
        host.red().bold()
    } else if changed > 0 {
        host.yellow()
    } else {
        host.green()
    };

    println!(
        "{:<30} : {}={:<4} {}={:<4} {}={:<4}",
        host_colored,
        "tasks".bright_white(),
        tasks,
        "changed".yellow(),
        changed,
        "failed".red(),
        failed,
    );
    println!("Results in file: {}", file);
}
