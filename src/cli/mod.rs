//! Command-line interface definitions.
//!
//! The binary is a thin wrapper: it parses a [`Cli`], turns the shared
//! [`CheckOptions`] into a library [`Config`], and maps the resulting
//! reports onto an exit code with [`evaluate_exit_code`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::config::{
    BrowserBackend, BrowserMode, Config, DomainSettings, FailOn, LogFormat, LogLevel,
    DEFAULT_BROWSER_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_RETRIES,
    DEFAULT_PHASE2_DEADLINE_SECS, DEFAULT_REMOTE_ENDPOINT, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, REMOTE_API_KEY_ENV,
};
use crate::error_handling::ConfigError;
use crate::report::VerdictStatus;

/// Exit code when the `--fail-on` policy trips.
pub const EXIT_POLICY_FAILED: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "email_qa", version, about = "Validate HTML emails against a requirements document")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate one email and print its report as JSON
    Validate(ValidateCommand),
    /// Validate several emails (optionally once per locale) and print a JSON array
    Batch(BatchCommand),
}

impl Command {
    pub fn options(&self) -> &CheckOptions {
        match self {
            Command::Validate(cmd) => &cmd.options,
            Command::Batch(cmd) => &cmd.options,
        }
    }
}

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// HTML email file
    pub email: PathBuf,

    /// Requirements JSON file
    pub requirements: PathBuf,

    #[command(flatten)]
    pub options: CheckOptions,
}

#[derive(Debug, Args)]
pub struct BatchCommand {
    /// Requirements JSON file shared by every email
    pub requirements: PathBuf,

    /// HTML email files
    #[arg(required = true)]
    pub emails: Vec<PathBuf>,

    /// Validate each email once per locale (repeatable, e.g. --locale fr_CA)
    #[arg(long = "locale")]
    pub locales: Vec<String>,

    #[command(flatten)]
    pub options: CheckOptions,
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct CheckOptions {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Domain configuration JSON (product checks, markers, UTM allow-lists)
    #[arg(long)]
    pub domain_config: Option<PathBuf>,

    /// Base URL for resolving relative links
    #[arg(long)]
    pub base_url: Option<Url>,

    /// Per-request timeout in seconds [default: domain config, else 10]
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Retries after the first reachability attempt [default: domain config, else 2]
    #[arg(long)]
    pub max_retries: Option<usize>,

    /// Maximum concurrent destination checks (and concurrent emails in a batch)
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Skip reachability checks
    #[arg(long)]
    pub skip_links: bool,

    /// Run product-listing checks on hosts configured for them
    #[arg(long)]
    pub product_check: bool,

    /// Product-listing backend
    #[arg(long, value_enum, default_value_t = BrowserMode::Static)]
    pub browser: BrowserMode,

    /// Rendering service endpoint for `--browser remote`
    #[arg(long, default_value = DEFAULT_REMOTE_ENDPOINT)]
    pub remote_endpoint: String,

    /// Per-page browser timeout in seconds
    #[arg(long, default_value_t = DEFAULT_BROWSER_TIMEOUT_SECS)]
    pub browser_timeout_seconds: u64,

    /// Wall-clock cap for all product-listing checks, in seconds
    #[arg(long, default_value_t = DEFAULT_PHASE2_DEADLINE_SECS)]
    pub deadline_seconds: u64,

    /// Exit code policy: never|any-failure|warnings
    #[arg(long, value_enum, default_value_t = FailOn::Never)]
    pub fail_on: FailOn,
}

impl CheckOptions {
    /// Loads `--domain-config`, or empty settings when none was given.
    pub fn load_domains(&self) -> Result<DomainSettings, ConfigError> {
        match &self.domain_config {
            Some(path) => DomainSettings::load(path),
            None => Ok(DomainSettings::default()),
        }
    }

    /// Builds the library configuration.
    ///
    /// Timeout and retries fall back to the domain configuration's global
    /// settings, then to the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` when `--browser remote` is
    /// selected without `api_key`.
    pub fn to_config(
        &self,
        domains: &DomainSettings,
        api_key: Option<String>,
    ) -> Result<Config, ConfigError> {
        let global = &domains.global_settings;
        let browser = match self.browser {
            BrowserMode::Disabled => BrowserBackend::Disabled,
            BrowserMode::Static => BrowserBackend::Static,
            BrowserMode::Remote => BrowserBackend::Remote {
                endpoint: self.remote_endpoint.clone(),
                api_key: api_key
                    .filter(|key| !key.trim().is_empty())
                    .ok_or(ConfigError::MissingApiKey(REMOTE_API_KEY_ENV))?,
            },
        };
        Ok(Config {
            timeout_seconds: self
                .timeout_seconds
                .or(global.request_timeout)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            max_retries: self
                .max_retries
                .or(global.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            max_concurrency: self.max_concurrency,
            user_agent: self.user_agent.clone(),
            base_url: self.base_url.clone(),
            check_links: !self.skip_links,
            check_products: self.product_check,
            browser,
            browser_timeout_seconds: self.browser_timeout_seconds,
            deadline_seconds: self.deadline_seconds,
        })
    }
}

/// Maps report statuses onto the process exit code for `fail_on`.
pub fn evaluate_exit_code(
    fail_on: FailOn,
    overall: impl IntoIterator<Item = VerdictStatus>,
) -> i32 {
    let tripped = match fail_on {
        FailOn::Never => false,
        FailOn::AnyFailure => overall.into_iter().any(|s| s == VerdictStatus::Fail),
        FailOn::Warnings => overall
            .into_iter()
            .any(|s| matches!(s, VerdictStatus::Fail | VerdictStatus::Warn)),
    };
    if tripped {
        EXIT_POLICY_FAILED
    } else {
        0
    }
}
