// SPDX-License-Identifier: MIT OR Apache-2.0

//! sdgalign - SDG alignment scoring tool
//!
//! Chunks planning documents, embeds them through an embedding model, and
//! scores them against SDG reference texts by cosine similarity.

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing with SDGALIGN_LOG env var (e.g., SDGALIGN_LOG=debug sdgalign score ...)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SDGALIGN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Score {
            candidates,
            references,
            reference_name,
            output,
            format,
            mode,
            pipeline,
        } => {
            let mut config = commands::load_config(cli.config.as_deref())?;
            commands::apply_overrides(&mut config, &pipeline);
            commands::score::run(
                &config,
                &candidates,
                &references,
                &reference_name,
                &output,
                format,
                mode,
                quiet,
            )?;
        }
        Commands::Compare {
            first,
            second,
            pipeline,
        } => {
            let mut config = commands::load_config(cli.config.as_deref())?;
            commands::apply_overrides(&mut config, &pipeline);
            commands::compare::run(&config, &first, &second, quiet)?;
        }
        Commands::Chunks { file, pipeline } => {
            let mut config = commands::load_config(cli.config.as_deref())?;
            commands::apply_overrides(&mut config, &pipeline);
            commands::chunks::run(&config, &file, quiet)?;
        }
        Commands::Keywords {
            keywords,
            corpus,
            output,
            format,
            stopwords,
        } => {
            let mut config = commands::load_config(cli.config.as_deref())?;
            commands::add_stopword_paths(&mut config, &stopwords);
            commands::keywords::run(&config, &keywords, &corpus, &output, format, quiet)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sdgalign", &mut std::io::stdout());
        }
    }

    Ok(())
}
