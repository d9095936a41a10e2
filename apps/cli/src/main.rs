//! bock CLI: static wiki generator for git-tracked markdown folders.
//!
//! Renders every article and folder of an article root into a browsable
//! HTML site, with per-commit revision pages and a full-text search database.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);

    match commands::run(cli).await {
        Ok(()) => Ok(()),
        Err(report) => match report.downcast_ref::<bock_shared::BockError>() {
            Some(err) => {
                eprintln!("Error: {err}");
                std::process::exit(err.exit_code());
            }
            None => Err(report),
        },
    }
}
