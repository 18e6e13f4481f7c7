mod channel;
mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{
    completions, contacts, import, logs, preview, send, templates, Context,
};
use crate::error::{exit_code_for, report_error};
use missive_config as config;
use missive_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "missive", version, about = "Personalized bulk messages from a CSV contact list")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
    /// Import contacts from a CSV file with name and phone columns
    Import(import::ImportArgs),
    List(contacts::ListArgs),
    Show(contacts::ShowArgs),
    Delete(contacts::DeleteArgs),
    #[command(name = "clear-contacts")]
    ClearContacts(contacts::ClearArgs),
    #[command(subcommand)]
    Template(templates::TemplateCommand),
    /// Render a template for contacts without sending anything
    Preview(preview::PreviewArgs),
    /// Render and deliver a template to contacts, one at a time
    Send(send::SendArgs),
    #[command(subcommand)]
    Logs(logs::LogsCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    if let Command::Completions(args) = command {
        return completions::emit(args);
    }

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }

    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    let store =
        Store::open(&db_path).with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let ctx = Context {
        store: &store,
        json,
        config: &app_config,
    };

    match command {
        Command::Import(args) => import::import_csv(&ctx, args),
        Command::List(args) => contacts::list_contacts(&ctx, args),
        Command::Show(args) => contacts::show_contact(&ctx, args),
        Command::Delete(args) => contacts::delete_contact(&ctx, args),
        Command::ClearContacts(args) => contacts::clear_contacts(&ctx, args),
        Command::Template(cmd) => match cmd {
            templates::TemplateCommand::Save(args) => templates::save_template(&ctx, args),
            templates::TemplateCommand::Ls(args) => templates::list_templates(&ctx, args),
        },
        Command::Preview(args) => preview::preview(&ctx, args),
        Command::Send(args) => send::send(&ctx, args),
        Command::Logs(cmd) => match cmd {
            logs::LogsCommand::Ls(args) => logs::list_logs(&ctx, args),
            logs::LogsCommand::Stats(args) => logs::log_stats(&ctx, args),
            logs::LogsCommand::Clear(args) => logs::clear_logs(&ctx, args),
        },
        Command::Completions(_) => {
            unreachable!("completions command handled before store initialization")
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
