#![deny(missing_docs)]

//! # Specgen CLI
//!
//! Command Line Interface for deriving OpenAPI documents from recorded
//! integration-test examples.
//!
//! Supported Commands:
//! - `generate`: Examples -> accumulated documents -> files under the root.
//! - `validate`: Checks one example's request and response against its schemas.
//! - `show`: Prints a generated document as it would be served.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod error;
mod examples;
mod generate;
mod show;
mod validate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI document generator for integration tests")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record examples into the configured documents and write them.
    Generate(generate::GenerateArgs),
    /// Validate one example's request and response.
    Validate(validate::ValidateArgs),
    /// Print a generated document for a request path.
    Show(show::ShowArgs),
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate(args) => {
            generate::execute(args)?;
        }
        Commands::Validate(args) => validate::execute(args)?,
        Commands::Show(args) => println!("{}", show::execute(args)?),
    }

    Ok(())
}
