use crate::commands::{print_json, resolve_template, select_contacts, Context, TemplateSourceArgs};
use anyhow::Result;
use clap::Args;
use missive_core::dispatch::prepare_outbound;
use missive_core::domain::{unresolved_placeholders, PhoneNormalizer};
use missive_core::dto::PreviewDto;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: TemplateSourceArgs,
    /// Preview only these contacts (repeatable); defaults to all
    #[arg(long, value_name = "ID")]
    pub contact: Vec<String>,
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
}

pub fn preview(ctx: &Context<'_>, args: PreviewArgs) -> Result<()> {
    let template = resolve_template(ctx, &args.source)?;
    let contacts = select_contacts(ctx, &args.contact)?;
    let normalizer = PhoneNormalizer::new(ctx.config.default_country_code.clone());

    let items: Vec<PreviewDto> = contacts
        .iter()
        .take(args.limit)
        .map(|contact| {
            let outbound = prepare_outbound(&template, contact, &normalizer);
            PreviewDto {
                contact_id: outbound.contact_id,
                name: outbound.name,
                phone: outbound.phone,
                message: outbound.message,
                unresolved: unresolved_placeholders(&template, contact),
            }
        })
        .collect();

    if ctx.json {
        return print_json(&items);
    }

    if items.is_empty() {
        println!("no contacts");
        return Ok(());
    }

    for item in &items {
        println!("--- {} ({})", item.name, item.phone);
        println!("{}", item.message);
        if !item.unresolved.is_empty() {
            let names: Vec<String> = item
                .unresolved
                .iter()
                .map(|ident| format!("{{{ident}}}"))
                .collect();
            println!("(unresolved: {})", names.join(", "));
        }
    }
    if contacts.len() > items.len() {
        println!("... {} more", contacts.len() - items.len());
    }
    Ok(())
}
