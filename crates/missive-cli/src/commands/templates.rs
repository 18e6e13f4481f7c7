use crate::commands::{print_json, Context};
use crate::util::{format_timestamp_datetime, now_utc, one_line};
use anyhow::Result;
use clap::{Args, Subcommand};
use missive_store::repo::DEFAULT_TEMPLATE_LIMIT;

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    Save(TemplateSaveArgs),
    Ls(TemplateListArgs),
}

#[derive(Debug, Args)]
pub struct TemplateSaveArgs {
    pub content: String,
}

#[derive(Debug, Args)]
pub struct TemplateListArgs {
    #[arg(long, default_value_t = DEFAULT_TEMPLATE_LIMIT)]
    pub limit: i64,
}

pub fn save_template(ctx: &Context<'_>, args: TemplateSaveArgs) -> Result<()> {
    let template = ctx.store.templates().save(now_utc(), &args.content)?;
    if ctx.json {
        return print_json(&template);
    }
    println!("saved template {}", template.id);
    if !template.placeholders.is_empty() {
        println!("placeholders: {}", template.placeholders.join(", "));
    }
    Ok(())
}

pub fn list_templates(ctx: &Context<'_>, args: TemplateListArgs) -> Result<()> {
    let templates = ctx.store.templates().list(args.limit)?;
    if ctx.json {
        return print_json(&templates);
    }

    if templates.is_empty() {
        println!("no templates");
        return Ok(());
    }

    for template in templates {
        println!(
            "{}  {}  {}",
            template.id,
            format_timestamp_datetime(template.created_at),
            one_line(&template.content, 60)
        );
    }
    Ok(())
}
