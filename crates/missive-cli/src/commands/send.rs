use crate::channel::build_channel;
use crate::commands::{print_json, resolve_template, select_contacts, Context, TemplateSourceArgs};
use crate::error::invalid_input;
use crate::util::now_utc;
use anyhow::Result;
use clap::{Args, ValueEnum};
use missive_config::ChannelBackend;
use missive_core::dispatch::{BatchSummary, DispatchPolicy, Dispatcher};
use missive_core::domain::{ContactId, PhoneNormalizer, SendStatus};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub source: TemplateSourceArgs,
    /// Send only to these contacts (repeatable); defaults to all
    #[arg(long, value_name = "ID")]
    pub contact: Vec<String>,
    /// Pause between consecutive sends, overriding send.delay_ms
    #[arg(long)]
    pub delay_ms: Option<u64>,
    /// Delivery channel, overriding channel.backend
    #[arg(long, value_enum)]
    pub channel: Option<ChannelArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChannelArg {
    Stdout,
    Link,
    Webhook,
}

impl From<ChannelArg> for ChannelBackend {
    fn from(value: ChannelArg) -> Self {
        match value {
            ChannelArg::Stdout => ChannelBackend::Stdout,
            ChannelArg::Link => ChannelBackend::Link,
            ChannelArg::Webhook => ChannelBackend::Webhook,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendResultDto {
    contact_id: ContactId,
    name: String,
    phone: String,
    status: SendStatus,
    reference: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendReport {
    #[serde(flatten)]
    summary: BatchSummary,
    message: String,
    results: Vec<SendResultDto>,
}

pub fn send(ctx: &Context<'_>, args: SendArgs) -> Result<()> {
    let template = resolve_template(ctx, &args.source)?;
    let contacts = select_contacts(ctx, &args.contact)?;
    if contacts.is_empty() {
        return Err(invalid_input("no contacts to send to"));
    }

    let backend = args
        .channel
        .map(ChannelBackend::from)
        .unwrap_or(ctx.config.channel.backend);
    let channel = build_channel(backend, &ctx.config.channel, ctx.json)?;
    let normalizer = PhoneNormalizer::new(ctx.config.default_country_code.clone());
    let policy = DispatchPolicy {
        delay: args
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| ctx.config.send.delay()),
    };
    info!(
        contacts = contacts.len(),
        channel = channel.name(),
        delay_ms = policy.delay.as_millis() as u64,
        "dispatch started"
    );

    let logs = ctx.store.message_logs();
    let mut dispatcher = Dispatcher::new(&template, &contacts, channel, &normalizer, policy);
    let mut summary = BatchSummary::default();
    let mut results = Vec::with_capacity(contacts.len());

    while let Some(outbound) = dispatcher.prepare_next() {
        let pending = logs.create_pending(
            now_utc(),
            outbound.contact_id,
            &outbound.phone,
            &outbound.message,
        )?;
        let outcome = dispatcher.deliver(outbound);
        summary.record(&outcome);

        let log = match &outcome.result {
            Ok(receipt) => {
                info!(contact = %outcome.outbound.contact_id, phone = %outcome.outbound.phone, "sent");
                let log = logs.mark_sent(now_utc(), pending.id)?;
                if !ctx.json {
                    match receipt.reference.as_deref() {
                        Some(reference) => println!("sent {}: {}", outcome.outbound.name, reference),
                        None => println!("sent {}", outcome.outbound.name),
                    }
                }
                log
            }
            Err(err) => {
                warn!(contact = %outcome.outbound.contact_id, phone = %outcome.outbound.phone, error = %err, "delivery failed");
                if !ctx.json {
                    println!("failed {}: {}", outcome.outbound.name, err);
                }
                logs.mark_failed(pending.id, err.message())?
            }
        };

        results.push(SendResultDto {
            contact_id: outcome.outbound.contact_id,
            name: outcome.outbound.name,
            phone: outcome.outbound.phone,
            status: log.status,
            reference: outcome.result.ok().and_then(|receipt| receipt.reference),
            error: log.error_message,
        });
    }

    info!(
        sent = summary.sent_count,
        failed = summary.failed_count,
        "dispatch finished"
    );

    if ctx.json {
        return print_json(&SendReport {
            summary,
            message: summary.message(),
            results,
        });
    }

    println!("{}", summary.message());
    Ok(())
}
