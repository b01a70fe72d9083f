//! Binary entry point for deckwise.
//!
//! This binary provides the CLI interface for the deck-building advisor.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stdout/print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use deckwise::models::SearchExpression;
use deckwise::observability::{self, LogFormat};
use deckwise::{Advisor, DeckwiseConfig};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Deckwise - a retrieval-grounded Magic: The Gathering strategy advisor.
#[derive(Parser)]
#[command(name = "deckwise")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log output format: pretty or json.
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Ask for strategy advice and matching cards.
    Ask {
        /// The question to ask.
        utterance: String,

        /// Session id for conversational continuity.
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Clear a session's conversation history.
    Reset {
        /// The session id to reset.
        session: String,
    },

    /// Search Scryfall directly with one expression.
    Search {
        /// The search expression in Scryfall syntax.
        expression: String,

        /// Maximum number of cards to return.
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Interactive advisory session.
    Repl {
        /// Session id; a fresh one is generated if omitted.
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// The shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    // A local .env supplies API keys during development.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    observability::init_logging(LogFormat::parse(&cli.log_format), cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "deckwise", &mut std::io::stdout());
        return Ok(());
    }

    let config = match cli.config {
        Some(ref path) => DeckwiseConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DeckwiseConfig::load_default(),
    };

    let advisor = Advisor::from_config(&config);

    match cli.command {
        Commands::Ask { utterance, session } => {
            let reply = advisor
                .ask(&utterance, session.as_deref())
                .context("advisory turn failed")?;
            println!("{reply}");
            Ok(())
        },

        Commands::Reset { session } => {
            advisor.reset(&session);
            println!("session '{session}' reset");
            Ok(())
        },

        Commands::Search { expression, limit } => {
            let expression =
                SearchExpression::parse(&expression).context("invalid search expression")?;
            let cards = advisor
                .search(&expression, limit)
                .context("card search failed")?;

            if cards.is_empty() {
                println!("no cards matched");
                return Ok(());
            }
            for card in cards {
                println!(
                    "{} ({}) - {} [{}]",
                    card.name, card.mana_cost, card.type_line, card.rarity
                );
            }
            Ok(())
        },

        Commands::Repl { session } => repl(&advisor, session),

        Commands::Completions { .. } => Ok(()),
    }
}

/// Runs the interactive loop until EOF or `/quit`.
fn repl(advisor: &Advisor, session: Option<String>) -> anyhow::Result<()> {
    let session_id = session.unwrap_or_else(|| format!("repl-{}", uuid::Uuid::new_v4()));

    println!("deckwise interactive session '{session_id}'");
    println!("commands: /reset clears history, /quit exits");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("deckwise> ");
        std::io::stdout().flush().context("flushing prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading input")?;
        let line = line.trim();

        match line {
            "" => {},
            "/quit" | "/exit" => break,
            "/reset" => {
                advisor.reset(&session_id);
                println!("history cleared");
            },
            _ => match advisor.ask(line, Some(&session_id)) {
                Ok(reply) => println!("\n{reply}\n"),
                Err(e) => eprintln!("error: {e}"),
            },
        }
    }

    Ok(())
}
