/*!
 * nlterm CLI - natural-language terminal
 *
 * Interactive REPL plus one-shot subcommands over the nlterm_core engine.
 * Every subcommand accepts --json for machine-readable output.
 */

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nlterm_core::structured_log::{init_logger, LogLevel};
use nlterm_core::{classify, Session, SessionResponse, TerminalConfig};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "nlterm_cli")]
#[command(about = "Natural-language terminal - type commands or plain English", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Starting directory (overrides the config file)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Emit JSON instead of plain text
    #[arg(short, long, global = true)]
    json: bool,

    /// Minimum log level (debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session reading lines from stdin
    Repl,

    /// Interpret and run a single line
    Exec {
        /// The line to run (words are joined with spaces)
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },

    /// Show what a line would resolve to without running it
    Interpret {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Classify a line as command or natural language
    Classify {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Suggest completions for partial input
    Suggest {
        #[arg(trailing_var_arg = true)]
        partial: Vec<String>,
    },

    /// Print session status
    Status,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            nlterm_core::slog_error!("CLI", "fatal", &format!("{:#}", e), None);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<TerminalConfig> {
    let mut config = TerminalConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.dir {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Directory not accessible: {:?}", dir))?;
        config.initial_directory = Some(dir);
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli)?;
    init_logger(config.logging.to_log_config());

    match &cli.command {
        Commands::Repl => repl(&config, cli.json).await,
        Commands::Exec { line } => {
            let mut session = Session::new(&config);
            let response = session.submit(&line.join(" ")).await;
            print_response(&response, cli.json)?;
            Ok(response.exit_code)
        }
        Commands::Interpret { text } => {
            let session = Session::new(&config);
            let result = session.interpreter().process_input(&text.join(" ")).await;
            if cli.json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                match &result.resolved_command {
                    Some(command) => println!("{}", command),
                    None => println!("{}", result.explanation.as_deref().unwrap_or("")),
                }
            }
            Ok(if result.resolved_command.is_some() { 0 } else { 1 })
        }
        Commands::Classify { text } => {
            let text = text.join(" ");
            let kind = classify(&text);
            if cli.json {
                println!("{}", json!({ "input": text, "kind": kind }));
            } else {
                println!("{}", serde_json::to_value(kind)?.as_str().unwrap_or_default());
            }
            Ok(0)
        }
        Commands::Suggest { partial } => {
            let session = Session::new(&config);
            let suggestions = session.suggest(&partial.join(" ")).await;
            if cli.json {
                println!("{}", serde_json::to_string(&suggestions)?);
            } else {
                for s in suggestions {
                    println!("{}", s);
                }
            }
            Ok(0)
        }
        Commands::Status => {
            let session = Session::new(&config);
            let status = session.status();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("session:   {}", status.session_id);
                println!("directory: {}", status.current_directory);
                println!("history:   {}", status.history_len);
                println!("remote:    {}", if status.remote_available { "available" } else { "unavailable" });
            }
            Ok(0)
        }
        Commands::Version => {
            println!("nlterm_cli v{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

fn print_response(response: &SessionResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(response)?);
        return Ok(());
    }

    if response.interpretation.is_natural_language {
        if let Some(explanation) = &response.interpretation.explanation {
            eprintln!("{}", explanation);
        }
    }
    if !response.output.is_empty() && !response.exit_requested {
        println!("{}", response.output);
    }
    if let Some(fix) = &response.did_you_mean {
        eprintln!("Did you mean '{}'?", fix.command);
    }
    Ok(())
}

async fn repl(config: &TerminalConfig, json: bool) -> Result<i32> {
    let mut session = Session::new(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_code = 0;

    loop {
        if !json {
            print!("{}", session.prompt());
            std::io::stdout().flush()?;
        }

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        let response = session.submit(&line).await;
        print_response(&response, json)?;
        last_code = response.exit_code;

        if response.exit_requested {
            break;
        }
    }

    Ok(last_code)
}
