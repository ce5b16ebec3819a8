use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

use pseudonym_gateway::cli;
use pseudonym_gateway::pseudonyms::CipherSuite;

#[derive(Parser)]
#[command(
    name = "pseudonym-gateway",
    version,
    about = "Rule-driven pseudonymization of API payloads"
)]
struct Cli {
    /// Log at debug level (to stderr)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sanitize a JSON response fetched from URL
    Sanitize {
        /// Options file (YAML or JSON)
        #[arg(long)]
        config: PathBuf,
        /// URL the response came from
        #[arg(long)]
        url: String,
        /// Read the response from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Sanitize a CSV export
    SanitizeCsv {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Check whether the rules allow fetching URL
    Allowed {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        url: String,
    },
    /// Print a reversible token for an identifier
    Tokenize {
        identifier: String,
        /// Salt; defaults to PSOXY_SALT
        #[arg(long)]
        salt: Option<String>,
        #[arg(long, default_value_t = CipherSuite::Cbc)]
        cipher: CipherSuite,
    },
    /// Reverse every token embedded in TEXT
    Reverse {
        text: String,
        #[arg(long)]
        salt: Option<String>,
        #[arg(long, default_value_t = CipherSuite::Cbc)]
        cipher: CipherSuite,
    },
    /// Print the sha256 of the active rule set
    RulesSha {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match args.command {
        Commands::Sanitize { config, url, input } => {
            cli::sanitize::run(&config, &url, input.as_deref())?
        }
        Commands::SanitizeCsv { config, input } => {
            cli::sanitize::run_csv(&config, input.as_deref())?
        }
        Commands::Allowed { config, url } => cli::sanitize::run_allowed(&config, &url)?,
        Commands::Tokenize {
            identifier,
            salt,
            cipher,
        } => cli::tokens::run_tokenize(&identifier, salt.as_deref(), cipher)?,
        Commands::Reverse { text, salt, cipher } => {
            cli::tokens::run_reverse(&text, salt.as_deref(), cipher)?
        }
        Commands::RulesSha { config } => cli::sanitize::run_rules_sha(&config)?,
    }

    Ok(())
}
