//! agent-matcher - persona routing service
//!
//! This is the main entry point for the agent-matcher binary.
//! `serve` runs the HTTP API; the other commands are one-shot helpers
//! for asking a question, listing agents, reading history and managing
//! configuration.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use agent_matcher::cli::{self, Cli, Commands};
use agent_matcher::config::{self, AppConfig};
use agent_matcher::error::{Error, Result};
use agent_matcher::history::HistoryStore;
use agent_matcher::llm::{OpenAiClient, SharedChatModel};
use agent_matcher::logging::{self, LogGuards};
use agent_matcher::persona::PersonaRegistry;
use agent_matcher::pipeline::AgentMatcher;
use agent_matcher::server::{self, AppState};
use agent_matcher::version;

fn main() {
    if let Err(e) = run() {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    // Commands that never touch the model get minimal logging
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone());
        }
        Commands::Agents => {
            print_agents(&PersonaRegistry::builtin());
            return Ok(());
        }
        _ => {}
    }

    let config_path = match &cli.command {
        Commands::Serve { config, .. }
        | Commands::Ask { config, .. }
        | Commands::History { config, .. } => config.clone(),
        _ => None,
    };

    let mut config = AppConfig::load(config_path.as_deref())?;

    if let Commands::Serve { bind, port, .. } = &cli.command {
        if let Some(bind) = bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = init_logging_for(&cli, &config)?;

    match cli.command {
        Commands::Serve { .. } => run_server(config),
        Commands::Ask { prompt, .. } => run_ask(config, &prompt),
        Commands::History { limit, .. } => run_history(config, limit),
        Commands::Version | Commands::Config { .. } | Commands::Agents => {
            // Already handled above
            unreachable!();
        }
    }
}

/// Full logging for the server, stderr-only for one-shot commands
fn init_logging_for(cli: &Cli, config: &AppConfig) -> Result<Option<LogGuards>> {
    match cli.command {
        Commands::Serve { .. } => {
            let guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;
            Ok(Some(guards))
        }
        _ => {
            let level = match (cli.quiet, cli.verbose) {
                (true, _) => tracing::Level::ERROR,
                (false, 0) => tracing::Level::WARN,
                (false, 1) => tracing::Level::INFO,
                (false, _) => tracing::Level::DEBUG,
            };
            logging::init_simple(level)?;
            Ok(None)
        }
    }
}

fn build_runtime(config: &AppConfig) -> Result<tokio::runtime::Runtime> {
    let workers = if config.server.worker_threads > 0 {
        config.server.worker_threads as usize
    } else {
        num_cpus::get().min(8)
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(workers)
        .thread_name("agent-matcher")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))
}

/// Assemble the pipeline from configuration
fn build_matcher(config: &AppConfig) -> Result<AgentMatcher> {
    if config.openai.api_key.is_empty() {
        warn!("No API key configured; set AGENT_MATCHER_OPENAI_API_KEY or OPENAI_API_KEY");
    }

    let model: SharedChatModel = Arc::new(OpenAiClient::new(&config.openai)?);
    let registry = Arc::new(PersonaRegistry::builtin());
    let history = Arc::new(HistoryStore::new(
        config.history_path(),
        config.history.format,
    ));

    Ok(AgentMatcher::new(model, registry, history))
}

/// Run the HTTP server until Ctrl-C
fn run_server(config: AppConfig) -> Result<()> {
    let build = version::build_info();
    info!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting agent-matcher"
    );
    info!(
        base_url = %config.openai.base_url,
        model = %config.openai.model,
        history = %config.history.path,
        history_format = %config.history.format,
        "Configuration loaded"
    );

    let runtime = build_runtime(&config)?;
    runtime.block_on(async {
        let addr = resolve_listen_addr(&config.listen_addr()).await?;
        let state = Arc::new(AppState::new(build_matcher(&config)?));
        server::serve(state, addr).await
    })
}

async fn resolve_listen_addr(listen: &str) -> Result<SocketAddr> {
    tokio::net::lookup_host(listen)
        .await
        .map_err(|e| Error::config_field_invalid("server.bind", format!("{}: {}", listen, e)))?
        .next()
        .ok_or_else(|| {
            Error::config_field_invalid("server.bind", format!("{} did not resolve", listen))
        })
}

/// Ask a single question and print the response JSON
fn run_ask(config: AppConfig, prompt: &str) -> Result<()> {
    let runtime = build_runtime(&config)?;
    let response = runtime.block_on(async { build_matcher(&config)?.ask(prompt).await })?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Print the most recent interaction records
fn run_history(config: AppConfig, limit: usize) -> Result<()> {
    let store = HistoryStore::new(config.history_path(), config.history.format);
    let runtime = build_runtime(&config)?;
    let records = runtime.block_on(store.recent(limit))?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn print_agents(registry: &PersonaRegistry) {
    for agent in registry.agents() {
        let marker = if agent.name == registry.default_agent_name() {
            " (default)"
        } else {
            ""
        };
        println!("{}{}", agent.name, marker);
        println!("    {}", agent.role);
    }
}

/// Handle config subcommands
fn handle_config_command(subcommand: cli::ConfigSubcommand) -> Result<()> {
    use cli::ConfigSubcommand;

    match subcommand {
        ConfigSubcommand::Show { config } => {
            let mut cfg = AppConfig::load(config.as_deref())?;
            if !cfg.openai.api_key.is_empty() {
                cfg.openai.api_key = "<redacted>".to_string();
            }
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let created = config::init_config(path.as_deref(), force)?;
            println!("Created configuration file: {}", created.display());
        }
        ConfigSubcommand::Validate { config } => {
            AppConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
