//! CLI argument parsing using clap v4

use clap::{Parser, Subcommand};

/// agent-matcher - route questions to the right persona agents
///
/// Serves `POST /ask`: a triage model call picks which agents answer, each
/// selected agent answers in turn, and the interaction is logged to disk.
#[derive(Parser, Debug)]
#[command(name = "agent-matcher")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(short, long, env = "AGENT_MATCHER_CONFIG")]
        config: Option<String>,

        /// Bind address (overrides [server].bind)
        #[arg(short, long)]
        bind: Option<String>,

        /// Listen port (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask one question without starting the server
    Ask {
        /// The question to route
        prompt: String,

        /// Path to configuration file
        #[arg(short, long, env = "AGENT_MATCHER_CONFIG")]
        config: Option<String>,
    },

    /// List the registered agents
    Agents,

    /// Show recent interactions from the history file
    History {
        /// Path to configuration file
        #[arg(short, long, env = "AGENT_MATCHER_CONFIG")]
        config: Option<String>,

        /// Number of most recent records to print
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["agent-matcher", "serve"]);
        match cli.command {
            Commands::Serve { bind, port, .. } => {
                assert!(bind.is_none());
                assert!(port.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_serve_with_overrides() {
        let cli = Cli::parse_from([
            "agent-matcher",
            "serve",
            "--config",
            "/etc/agent-matcher/config.toml",
            "--bind",
            "0.0.0.0",
            "--port",
            "9000",
        ]);
        match cli.command {
            Commands::Serve { config, bind, port } => {
                assert_eq!(config.as_deref(), Some("/etc/agent-matcher/config.toml"));
                assert_eq!(bind.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_ask_prompt() {
        let cli = Cli::parse_from(["agent-matcher", "ask", "What is your refund policy?"]);
        match cli.command {
            Commands::Ask { prompt, .. } => assert_eq!(prompt, "What is your refund policy?"),
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_history_limit() {
        let cli = Cli::parse_from(["agent-matcher", "history"]);
        match cli.command {
            Commands::History { limit, .. } => assert_eq!(limit, 10),
            _ => panic!("Expected History command"),
        }

        let cli = Cli::parse_from(["agent-matcher", "history", "-n", "3"]);
        match cli.command {
            Commands::History { limit, .. } => assert_eq!(limit, 3),
            _ => panic!("Expected History command"),
        }
    }

    #[test]
    fn test_verbose_flags() {
        let cli = Cli::parse_from(["agent-matcher", "-vv", "version"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["agent-matcher", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
