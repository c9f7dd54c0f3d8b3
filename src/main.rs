use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use rootbound::{
    Config, Outcome,
    cli::{Cli, Commands, ConfigCommands},
    core::agent::ChatEvent,
};

/// Exit code when the round budget runs out without an answer.
const EXIT_BUDGET_EXHAUSTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    // Credentials may live in a .env next to the project
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Some(Commands::Config { command }) = &cli.command {
        match command {
            ConfigCommands::Show => {
                let mut config = Config::load()?;
                cli.apply_overrides(&mut config);
                print!("{}", config.to_toml()?);
            }
            ConfigCommands::Path => {
                let path = Config::config_path()?;
                println!("{}", path.display());
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(instruction) = cli.instruction() else {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    };

    let mut config = Config::load()?;
    cli.apply_overrides(&mut config);

    let mut agent = config.build_agent()?;
    let verbose = cli.verbose > 0;

    if verbose {
        println!("User prompt: {instruction}\n");
    }

    let outcome = agent
        .run(&instruction, |event| print_event(&event, verbose))
        .await?;

    match outcome {
        Outcome::Answer(text) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::BudgetExhausted { rounds } => {
            eprintln!("No final answer after {rounds} rounds; stopping.");
            Ok(ExitCode::from(EXIT_BUDGET_EXHAUSTED))
        }
    }
}

fn print_event(event: &ChatEvent, verbose: bool) {
    match event {
        ChatEvent::Text(text) => {
            if verbose {
                println!("{text}");
            }
        }
        ChatEvent::ToolStart { name, arguments } => {
            if verbose {
                println!("- Calling function: {name}({arguments})");
            } else {
                println!("- Calling function: {name}");
            }
        }
        ChatEvent::ToolCall {
            name,
            output,
            is_error,
            ..
        } => {
            if verbose {
                let label = if *is_error { "error" } else { "result" };
                println!("-> {name} {label}:\n{output}\n");
            }
        }
        ChatEvent::Usage {
            input_tokens,
            output_tokens,
        } => {
            if verbose {
                println!("Prompt tokens: {input_tokens}");
                println!("Response tokens: {output_tokens}");
            }
        }
    }
}
