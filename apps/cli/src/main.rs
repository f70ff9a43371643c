use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod logging;

use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::resolve(cli.now.as_deref())?;

    match cli.command {
        Commands::Import {
            file,
            format,
            fix_latex,
            output,
        } => commands::cmd_import(&file, format, fix_latex, output.as_deref()),
        Commands::Validate {
            file,
            normalize,
            json,
        } => commands::cmd_validate(&file, normalize, json),
        Commands::Answer {
            file,
            question,
            options,
            output,
        } => commands::cmd_answer(&file, &question, &options, output.as_deref(), &config),
        Commands::Due { file, json } => commands::cmd_due(&file, json, &config),
        Commands::Reset { file, output } => commands::cmd_reset(&file, output.as_deref()),
    }
}
