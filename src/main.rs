//! qsheet CLI entry point.

use clap::Parser;
use qsheet::cli::commands;
use qsheet::cli::{Cli, Commands, OutputFormat};
use qsheet::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.silent {
        qsheet::SILENT.store(true, std::sync::atomic::Ordering::Relaxed);
    }
    if cli.format == OutputFormat::Csv {
        qsheet::CSV_OUTPUT.store(true, std::sync::atomic::Ordering::Relaxed);
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR --format json OR non-TTY stdout
    let json = cli.json
        || cli.format == OutputFormat::Json
        || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let db = cli.db.as_ref();
    let actor = cli.actor.as_deref();

    match &cli.command {
        Commands::Init(args) => commands::init::execute(args, db, actor, json),
        Commands::Version => commands::version::execute(json),
        Commands::Completions { shell } => commands::completions::execute(shell),

        // Entities
        Commands::Topic { command } => commands::topic::execute(command, db, actor, json),
        Commands::Subtopic { command } => commands::subtopic::execute(command, db, actor, json),
        Commands::Question { command } => commands::question::execute(command, db, actor, json),

        // Views
        Commands::List(args) => commands::list::execute(args, db, actor, json),
        Commands::Stats => commands::stats::execute(db, actor, json),
        Commands::History { id, kind, limit } => {
            commands::history::execute(id.as_deref(), kind, *limit, db, actor, json)
        }

        // Whole sheet
        Commands::Export {
            kind,
            output,
            stdout,
        } => commands::export::execute(*kind, output.as_ref(), *stdout, db, actor, json),
        Commands::Import { file } => commands::sheet::import(file, db, actor, json),
        Commands::Seed { file, slug } => {
            commands::sheet::seed(file.as_deref(), slug.as_deref(), db, actor, json)
        }
        Commands::Clear => commands::sheet::clear(db, actor, json),
        Commands::Check => commands::sheet::check(db, actor, json),
    }
}
