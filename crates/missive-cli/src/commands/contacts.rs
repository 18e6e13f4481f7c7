use crate::commands::{print_json, Context};
use crate::error::not_found;
use crate::util::{format_timestamp_datetime, parse_contact_id};
use anyhow::Result;
use clap::Args;
use missive_core::dto::ContactListItemDto;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct ListArgs {}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ClearArgs {}

#[derive(Debug, Serialize)]
struct DeletedDto {
    deleted_count: usize,
}

pub fn list_contacts(ctx: &Context<'_>, _args: ListArgs) -> Result<()> {
    let contacts = ctx.store.contacts().list_all()?;
    let items: Vec<ContactListItemDto> = contacts
        .into_iter()
        .map(|contact| ContactListItemDto {
            id: contact.id,
            name: contact.name,
            phone: contact.phone,
            fields: contact.fields.into_keys().collect(),
        })
        .collect();

    if ctx.json {
        return print_json(&items);
    }

    if items.is_empty() {
        println!("no contacts");
        return Ok(());
    }

    for item in items {
        if item.fields.is_empty() {
            println!("{}  {}  {}", item.id, item.name, item.phone);
        } else {
            println!(
                "{}  {}  {}  [{}]",
                item.id,
                item.name,
                item.phone,
                item.fields.join(", ")
            );
        }
    }
    Ok(())
}

pub fn show_contact(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let id = parse_contact_id(&args.id)?;
    let contact = ctx
        .store
        .contacts()
        .get(id)?
        .ok_or_else(|| not_found("contact not found"))?;

    if ctx.json {
        return print_json(&contact);
    }

    println!("{}", contact.name);
    println!("id: {}", contact.id);
    println!("phone: {}", contact.phone);
    println!("added: {}", format_timestamp_datetime(contact.created_at));
    for (key, value) in &contact.fields {
        println!("{key}: {value}");
    }
    Ok(())
}

pub fn delete_contact(ctx: &Context<'_>, args: DeleteArgs) -> Result<()> {
    let id = parse_contact_id(&args.id)?;
    ctx.store.contacts().delete(id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    } else {
        println!("deleted {}", id);
    }
    Ok(())
}

pub fn clear_contacts(ctx: &Context<'_>, _args: ClearArgs) -> Result<()> {
    let deleted_count = ctx.store.contacts().clear()?;
    if ctx.json {
        return print_json(&DeletedDto { deleted_count });
    }
    println!("deleted {} contacts", deleted_count);
    Ok(())
}
