use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use oktactl::batch;
use oktactl::config::{Config, ORGANIZATION_ENV};
use oktactl::okta::auth::{ApiKey, API_KEY_ENV};
use oktactl::okta::client::OktaClient;
use oktactl::okta::http::{failure_hint, ReqwestTransport, DEFAULT_TIMEOUT};
use oktactl::resource::registry::get_resource;
use oktactl::resource::{lookup, supported_actions, Action, Invocation, ParameterSet, ResourceKind};
use oktactl::{OktaError, VERSION};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for the Okta admin API
#[derive(Parser, Debug)]
#[command(name = "oktactl", version = VERSION, about, long_about = None)]
struct Args {
    /// Okta organization (subdomain)
    #[arg(long, global = true, env = ORGANIZATION_ENV)]
    org: Option<String>,

    /// API token
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Full API root, overrides organization and provider domain
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Provider domain, e.g. oktapreview.com
    #[arg(long, global = true)]
    provider_domain: Option<String>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single action, e.g. `run groups create -p name=Admins`
    Run {
        /// Resource kind (apps, saml-apps, swa-apps, groups, users)
        resource: String,
        /// Action (create, update, delete, list, activate, ...)
        action: String,
        /// Parameters as key=value
        #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Run the tasks of a YAML file in order
    Apply {
        file: PathBuf,
        /// Requests in flight at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
    /// List supported actions and their parameters
    Actions {
        resource: Option<String>,
    },
    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Store the default organization
    SetOrg { organization: String },
    /// Print stored settings
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    if key.trim().is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{s}`"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("oktactl {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = Config::config_dir() {
        return config_dir.join("oktactl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".oktactl").join("oktactl.log");
    }
    PathBuf::from("oktactl.log")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;
    let mut config = Config::load();

    match &args.command {
        Command::Run {
            resource,
            action,
            params,
        } => {
            let kind: ResourceKind = resource.parse()?;
            let action: Action = action.parse()?;
            let invocation = Invocation::new(kind, action, ParameterSet::from_pairs(params.clone()));
            let client = connect(&args, &config)?;

            match client.invoke(&invocation).await {
                Ok(outcome) => {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    report_failure(&e)?;
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Apply { file, concurrency } => {
            let tasks = batch::load_tasks(file)?;
            let client = connect(&args, &config)?;
            let results = batch::run_tasks(&client, &tasks, *concurrency).await;

            let mut failed = false;
            let mut report = Vec::with_capacity(results.len());
            for task_result in results {
                let entry = match &task_result.result {
                    Ok(outcome) => json!({ "task": task_result.label, "result": outcome }),
                    Err(e) => {
                        failed = true;
                        if let Some(hint) = e.status().and_then(failure_hint) {
                            eprintln!("{}: {}", task_result.label, hint);
                        }
                        json!({ "task": task_result.label, "result": failure_json(e) })
                    }
                };
                report.push(entry);
            }
            if report.len() < tasks.len() {
                eprintln!(
                    "{} task(s) not started after failure",
                    tasks.len() - report.len()
                );
            }

            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        Command::Actions { resource } => {
            let kinds = match resource {
                Some(name) => vec![name.parse::<ResourceKind>()?],
                None => ResourceKind::ALL.to_vec(),
            };
            for kind in kinds {
                print_actions(kind)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { command } => {
            match command {
                ConfigCommand::SetOrg { organization } => {
                    config.set_organization(organization)?;
                    println!("Organization set to {}", organization.trim());
                }
                ConfigCommand::Show => {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Build a client from CLI/env and stored settings
fn connect(args: &Args, config: &Config) -> Result<OktaClient> {
    let api_key = args
        .api_key
        .as_deref()
        .map(ApiKey::new)
        .filter(|key| !key.is_empty())
        .with_context(|| format!("No API token. Set {} or use --api-key", API_KEY_ENV))?;

    if let Some(base_url) = config.effective_base_url(args.base_url.as_deref()) {
        tracing::info!("Using API root: {}", base_url);
        let transport = ReqwestTransport::new(config.timeout().unwrap_or(DEFAULT_TIMEOUT))?;
        return Ok(OktaClient::with_transport(&base_url, api_key, transport)?);
    }

    let organization = config
        .effective_organization(args.org.as_deref())
        .with_context(|| {
            format!(
                "No organization configured. Set {}, use --org or `oktactl config set-org`",
                ORGANIZATION_ENV
            )
        })?;
    let provider_domain = args
        .provider_domain
        .clone()
        .unwrap_or_else(|| config.effective_provider_domain());

    tracing::info!("Using organization: {}, domain: {}", organization, provider_domain);
    Ok(OktaClient::for_organization(
        &organization,
        &provider_domain,
        api_key,
        config.timeout(),
    )?)
}

fn failure_json(error: &OktaError) -> Value {
    let mut failure = json!({ "failed": true, "msg": error.to_string() });
    if let Some(status) = error.status() {
        failure["status"] = json!(status);
    }
    if let Some(url) = error.url() {
        failure["url"] = json!(url);
    }
    failure
}

fn report_failure(error: &OktaError) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&failure_json(error))?);
    if let Some(hint) = error.status().and_then(failure_hint) {
        eprintln!("{}", hint);
    }
    Ok(())
}

fn print_actions(kind: ResourceKind) -> Result<()> {
    let display_name = get_resource(kind)
        .map(|def| def.display_name.as_str())
        .unwrap_or_else(|| kind.key());
    println!("{} ({})", display_name, kind.key());

    for action in supported_actions(kind) {
        let spec = lookup(kind, action)?;
        println!("  {:<14} {} {}", action.as_str(), spec.method, spec.path);
        for param in &spec.params {
            let mut line = format!("      {:<24} {}", param.name, param.ty);
            if param.required {
                line.push_str(" (required)");
            }
            if let Some(default) = param.default.as_ref().filter(|_| spec.apply_defaults) {
                line.push_str(&format!(" [default: {}]", default));
            }
            println!("{}", line);
        }
    }
    println!();
    Ok(())
}
