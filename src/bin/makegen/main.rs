//! makegen CLI - build files from C/C++ include dependencies

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use makegen::core::ModelError;
use makegen::render::FormatError;
use makegen::resolver::ResolveError;
use makegen::util::diagnostic::{emit, Diagnostic};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        if color {
            if let Some(report) = report_for(&e) {
                eprintln!("{:?}", report);
                std::process::exit(1);
            }
        }
        match diagnostic_for(&e) {
            Some(diagnostic) => emit(&diagnostic, color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("makegen=debug")
    } else {
        EnvFilter::new("makegen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Gen(args) => commands::gen::execute(args),
        Commands::Deps(args) => commands::deps::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Structured diagnostic for the library errors that carry one.
fn diagnostic_for(err: &anyhow::Error) -> Option<Diagnostic> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ResolveError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<FormatError>() {
            Some(e.to_diagnostic())
        } else {
            cause.downcast_ref::<ModelError>().map(ModelError::to_diagnostic)
        }
    })
}

/// Graphical `miette` report, used when stderr is a color terminal.
fn report_for(err: &anyhow::Error) -> Option<miette::Report> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ResolveError>() {
            Some(miette::Report::new(e.to_report()))
        } else {
            cause
                .downcast_ref::<FormatError>()
                .map(|e| miette::Report::new(e.to_report()))
        }
    })
}
