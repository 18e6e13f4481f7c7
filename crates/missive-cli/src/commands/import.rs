use crate::commands::{print_json, Context};
use crate::util::now_utc;
use anyhow::{Context as _, Result};
use clap::Args;
use missive_import::csv::{self, ImportReport};
use missive_store::repo::ContactNew;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub file: PathBuf,
    /// Parse and report without storing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn import_csv(ctx: &Context<'_>, args: ImportArgs) -> Result<()> {
    csv::ensure_csv_path(&args.file)?;
    let data = fs::read_to_string(&args.file)
        .with_context(|| format!("read csv file {}", args.file.display()))?;
    let parsed = csv::parse_contacts_csv(&data)
        .with_context(|| format!("parse csv file {}", args.file.display()))?;
    debug!(
        rows = parsed.contacts.len(),
        skipped = parsed.skipped,
        "csv parsed"
    );
    for warning in &parsed.warnings {
        warn!("{warning}");
    }

    let inputs: Vec<ContactNew> = parsed
        .contacts
        .into_iter()
        .map(|contact| ContactNew {
            name: contact.name,
            phone: contact.phone,
            fields: contact.fields,
        })
        .collect();

    let created = if args.dry_run {
        inputs.len()
    } else {
        ctx.store.contacts().create_many(now_utc(), inputs)?.len()
    };

    let report = ImportReport {
        created,
        skipped: parsed.skipped,
        warnings: parsed.warnings,
        dry_run: args.dry_run,
    };

    if ctx.json {
        return print_json(&report);
    }

    if report.dry_run {
        println!("Would upload {} contacts", report.created);
    } else {
        println!("Uploaded {} contacts successfully", report.created);
    }
    if report.skipped > 0 {
        println!("skipped {} rows", report.skipped);
    }
    Ok(())
}
