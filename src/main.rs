//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `email_qa` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Printing reports as JSON on stdout
//!
//! All core functionality is implemented in the library crate.

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use email_qa::cli::{evaluate_exit_code, BatchCommand, Cli, Command, ValidateCommand};
use email_qa::config::REMOTE_API_KEY_ENV;
use email_qa::initialization::init_logger_with;
use email_qa::{
    localize_requirements, validate_batch, BatchJob, RequirementsDocument, Validator,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists).
    // Try the current directory first, then the executable's directory.
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    let options = cli.command.options();
    init_logger_with(options.log_level.clone().into(), options.log_format.clone())
        .context("Failed to initialize logger")?;

    match run(cli.command).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("email_qa error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn run(command: Command) -> Result<i32> {
    let options = command.options().clone();
    let domains = options
        .load_domains()
        .context("Failed to load domain configuration")?;
    let api_key = std::env::var(REMOTE_API_KEY_ENV).ok();
    let config = options
        .to_config(&domains, api_key)
        .context("Invalid configuration")?;
    let validator = Validator::new(config, domains).context("Failed to initialize validator")?;

    let code = match command {
        Command::Validate(cmd) => run_validate(&validator, cmd, &options).await?,
        Command::Batch(cmd) => run_batch(&validator, cmd, &options).await?,
    };
    validator.stats().log_summary();
    Ok(code)
}

async fn run_validate(
    validator: &Validator,
    cmd: ValidateCommand,
    options: &email_qa::cli::CheckOptions,
) -> Result<i32> {
    let html = read_email(&cmd.email).await?;
    let requirements = RequirementsDocument::load(&cmd.requirements)
        .with_context(|| format!("Failed to load requirements {}", cmd.requirements.display()))?;

    let report = validator
        .validate(&html, &requirements)
        .await
        .with_context(|| format!("Failed to validate {}", cmd.email.display()))?;

    println!(
        "{}",
        report.to_json_pretty().context("Failed to serialize report")?
    );
    Ok(evaluate_exit_code(options.fail_on, [report.summary.overall]))
}

async fn run_batch(
    validator: &Validator,
    cmd: BatchCommand,
    options: &email_qa::cli::CheckOptions,
) -> Result<i32> {
    let base = RequirementsDocument::load(&cmd.requirements)
        .with_context(|| format!("Failed to load requirements {}", cmd.requirements.display()))?;
    let variants = if cmd.locales.is_empty() {
        vec![base]
    } else {
        cmd.locales
            .iter()
            .map(|code| localize_requirements(&base, code))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --locale")?
    };

    let mut jobs = Vec::with_capacity(cmd.emails.len() * variants.len());
    for path in &cmd.emails {
        let html = read_email(path).await?;
        for requirements in &variants {
            jobs.push(BatchJob {
                name: path.display().to_string(),
                html: html.clone(),
                requirements: requirements.clone(),
            });
        }
    }

    let outcomes = validate_batch(validator, jobs, options.max_concurrency).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&outcomes).context("Failed to serialize reports")?
    );
    Ok(evaluate_exit_code(
        options.fail_on,
        outcomes.iter().map(|o| o.overall()),
    ))
}

async fn read_email(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read email {}", path.display()))
}
