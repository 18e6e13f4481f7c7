use anyhow::{Context as _, Result};
use clap::Args;
use missive_config::AppConfig;
use missive_core::domain::{validate_template, Contact};
use missive_store::Store;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::error::{invalid_input, not_found};
use crate::util::{parse_contact_id, parse_template_id};

pub mod completions;
pub mod contacts;
pub mod import;
pub mod logs;
pub mod preview;
pub mod send;
pub mod templates;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Exactly one of the three ways to supply message text.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct TemplateSourceArgs {
    /// Template text, e.g. "Hi {name}, from {company}"
    #[arg(long)]
    pub text: Option<String>,
    /// Read the template from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Use a saved template
    #[arg(long)]
    pub template_id: Option<String>,
}

pub fn resolve_template(ctx: &Context<'_>, source: &TemplateSourceArgs) -> Result<String> {
    let content = if let Some(text) = &source.text {
        text.clone()
    } else if let Some(path) = &source.file {
        fs::read_to_string(path)
            .with_context(|| format!("read template file {}", path.display()))?
    } else if let Some(raw) = &source.template_id {
        let id = parse_template_id(raw)?;
        ctx.store
            .templates()
            .get(id)?
            .ok_or_else(|| not_found(format!("template {id}")))?
            .content
    } else {
        return Err(invalid_input("one of --text, --file or --template-id is required"));
    };

    validate_template(&content)?;
    Ok(content)
}

/// Contacts named with `--contact` in the given order, or every contact.
pub fn select_contacts(ctx: &Context<'_>, raw_ids: &[String]) -> Result<Vec<Contact>> {
    if raw_ids.is_empty() {
        return Ok(ctx.store.contacts().list_all()?);
    }
    let ids = raw_ids
        .iter()
        .map(|raw| parse_contact_id(raw))
        .collect::<Result<Vec<_>>>()?;
    Ok(ctx.store.contacts().list_by_ids(&ids)?)
}
