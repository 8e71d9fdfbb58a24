// src/bin/shroute.rs

//! The `shroute` command-line entry point.

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use shroute::{
    CancellationToken,
    cli::Cli,
    constants::INTERRUPTED_EXIT_CODE,
    core::config_loader,
    core::task_executor::{self, TaskError},
    models::ShellSpec,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// The main entry point of the `shroute` application.
/// It sets up logging and cancellation, runs the requested task on a blocking thread,
/// and turns the outcome into a process exit code.
#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let cancellation_token: CancellationToken = Arc::new(AtomicBool::new(false));

    // Ctrl+C and --timeout only raise the flag; the dispatcher kills the running child.
    let token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::debug!("Interrupt received, cancelling.");
            token.store(true, Ordering::SeqCst);
        }
    });
    if let Some(secs) = cli.timeout {
        let token = cancellation_token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            log::debug!("Timeout of {}s reached, cancelling.", secs);
            token.store(true, Ordering::SeqCst);
        });
    }

    let outcome = tokio::task::spawn_blocking(move || run_cli(cli, &cancellation_token))
        .await
        .unwrap_or_else(|e| Err(anyhow!("Task thread failed: {}", e)));

    if let Err(e) = outcome {
        // --- Centralized Error Handling ---
        if let Some(task_err) = e.downcast_ref::<TaskError>() {
            if task_err.is_cancelled() {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            // A non-zero exit is relayed as-is, like a shell would.
            if let Some(code) = task_err.exit_status() {
                std::process::exit(i32::from(code));
            }
        }
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli, cancellation_token: &CancellationToken) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let config = config_loader::load_project_config(&cli.file)?;

    if cli.list || cli.task.is_none() {
        let mut names: Vec<_> = config.tasks.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        println!("{}", "Available tasks:".bold());
        for (name, task) in names {
            match &task.desc {
                Some(desc) => println!("  {} {}", name.cyan(), desc.dimmed()),
                None => println!("  {}", name.cyan()),
            }
        }
        return Ok(());
    }

    let task_name = cli.task.as_deref().unwrap_or_default();
    let root = cli
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let sh_override = cli
        .sh
        .as_deref()
        .map(|s| s.parse::<ShellSpec>().unwrap_or_default());

    let plan = task_executor::plan_task(&config, task_name, root, sh_override)?;
    task_executor::execute_task(&plan, cancellation_token)?;
    Ok(())
}
