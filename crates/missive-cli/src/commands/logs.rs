use crate::commands::{print_json, Context};
use crate::util::{format_timestamp_datetime, one_line};
use anyhow::Result;
use clap::{Args, Subcommand};
use missive_core::domain::SendStatus;
use missive_core::dto::StatusCountDto;
use missive_store::repo::{LogQuery, DEFAULT_LOG_LIMIT};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    Ls(LogsListArgs),
    Stats(LogsStatsArgs),
    Clear(LogsClearArgs),
}

#[derive(Debug, Args)]
pub struct LogsListArgs {
    /// pending, sent or failed
    #[arg(long, value_parser = parse_status)]
    pub status: Option<SendStatus>,
    #[arg(long, default_value_t = DEFAULT_LOG_LIMIT)]
    pub limit: i64,
}

#[derive(Debug, Args)]
pub struct LogsStatsArgs {}

#[derive(Debug, Args)]
pub struct LogsClearArgs {}

#[derive(Debug, Serialize)]
struct DeletedDto {
    deleted_count: usize,
}

fn parse_status(raw: &str) -> std::result::Result<SendStatus, String> {
    SendStatus::from_str(raw).map_err(|err| err.to_string())
}

pub fn list_logs(ctx: &Context<'_>, args: LogsListArgs) -> Result<()> {
    let logs = ctx.store.message_logs().list(LogQuery {
        status: args.status,
        limit: args.limit,
    })?;

    if ctx.json {
        return print_json(&logs);
    }

    if logs.is_empty() {
        println!("no message logs");
        return Ok(());
    }

    for log in logs {
        let when = format_timestamp_datetime(log.sent_at.unwrap_or(log.created_at));
        let mut line = format!(
            "{}  {:<7}  {}  {}  {}",
            when,
            log.status.as_str(),
            log.contact_id.short(),
            log.phone,
            one_line(&log.message, 50)
        );
        if let Some(error) = log.error_message.as_deref() {
            line.push_str(&format!("  ({error})"));
        }
        println!("{line}");
    }
    Ok(())
}

pub fn log_stats(ctx: &Context<'_>, _args: LogsStatsArgs) -> Result<()> {
    let counts: Vec<StatusCountDto> = ctx
        .store
        .message_logs()
        .counts()?
        .into_iter()
        .map(|(status, count)| StatusCountDto { status, count })
        .collect();

    if ctx.json {
        return print_json(&counts);
    }

    for item in counts {
        println!("{}: {}", item.status, item.count);
    }
    Ok(())
}

pub fn clear_logs(ctx: &Context<'_>, _args: LogsClearArgs) -> Result<()> {
    let deleted_count = ctx.store.message_logs().clear()?;
    if ctx.json {
        return print_json(&DeletedDto { deleted_count });
    }
    println!("deleted {} message logs", deleted_count);
    Ok(())
}
