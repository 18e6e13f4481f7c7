use crate::error::{Result, StoreError};
use missive_core::domain::{ContactId, MessageLog, MessageLogId, SendStatus};
use rusqlite::{params, Connection};
use std::str::FromStr;

pub const DEFAULT_LOG_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy)]
pub struct LogQuery {
    pub status: Option<SendStatus>,
    pub limit: i64,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            status: None,
            limit: DEFAULT_LOG_LIMIT,
        }
    }
}

pub struct MessageLogsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> MessageLogsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create_pending(
        &self,
        now_utc: i64,
        contact_id: ContactId,
        phone: &str,
        message: &str,
    ) -> Result<MessageLog> {
        let log = MessageLog::pending(now_utc, contact_id, phone, message);
        self.conn.execute(
            "INSERT INTO message_logs (id, contact_id, phone, message, status, sent_at, error_message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                log.id.to_string(),
                log.contact_id.to_string(),
                log.phone,
                log.message,
                log.status.as_str(),
                log.sent_at,
                log.error_message,
                log.created_at,
            ],
        )?;
        Ok(log)
    }

    pub fn mark_sent(&self, now_utc: i64, id: MessageLogId) -> Result<MessageLog> {
        self.transition(id, |log| log.mark_sent(now_utc))
    }

    pub fn mark_failed(&self, id: MessageLogId, error: &str) -> Result<MessageLog> {
        self.transition(id, |log| log.mark_failed(error))
    }

    pub fn get(&self, id: MessageLogId) -> Result<Option<MessageLog>> {
        get_inner(self.conn, id)
    }

    /// Newest first.
    pub fn list(&self, query: LogQuery) -> Result<Vec<MessageLog>> {
        let status = query.status.map(SendStatus::as_str);
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_id, phone, message, status, sent_at, error_message, created_at
             FROM message_logs
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![status, query.limit])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(log_from_row(row)?);
        }
        Ok(items)
    }

    /// Count per status, every status present even when zero.
    pub fn counts(&self) -> Result<Vec<(SendStatus, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM message_logs WHERE status = ?1;")?;
        let mut counts = Vec::with_capacity(SendStatus::ALL.len());
        for status in SendStatus::ALL {
            let count: i64 = stmt.query_row([status.as_str()], |row| row.get(0))?;
            counts.push((status, count));
        }
        Ok(counts)
    }

    pub fn clear(&self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM message_logs;", [])?;
        Ok(deleted)
    }

    fn transition(
        &self,
        id: MessageLogId,
        apply: impl FnOnce(&mut MessageLog) -> std::result::Result<(), missive_core::CoreError>,
    ) -> Result<MessageLog> {
        let tx = self.conn.unchecked_transaction()?;
        let mut log = get_inner(&tx, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        apply(&mut log)?;
        tx.execute(
            "UPDATE message_logs SET status = ?2, sent_at = ?3, error_message = ?4 WHERE id = ?1;",
            params![
                id.to_string(),
                log.status.as_str(),
                log.sent_at,
                log.error_message,
            ],
        )?;
        tx.commit()?;
        Ok(log)
    }
}

fn get_inner(conn: &Connection, id: MessageLogId) -> Result<Option<MessageLog>> {
    let mut stmt = conn.prepare(
        "SELECT id, contact_id, phone, message, status, sent_at, error_message, created_at
         FROM message_logs WHERE id = ?1;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(log_from_row(row)?)),
        None => Ok(None),
    }
}

fn log_from_row(row: &rusqlite::Row<'_>) -> Result<MessageLog> {
    let id_str: String = row.get(0)?;
    let id = MessageLogId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let contact_id_str: String = row.get(1)?;
    let contact_id = ContactId::from_str(&contact_id_str)
        .map_err(|_| StoreError::InvalidId(contact_id_str.clone()))?;
    let status_raw: String = row.get(4)?;
    let status = SendStatus::from_str(&status_raw)
        .map_err(|_| StoreError::CorruptRow(format!("message log {id_str}: status {status_raw}")))?;
    Ok(MessageLog {
        id,
        contact_id,
        phone: row.get(2)?,
        message: row.get(3)?,
        status,
        sent_at: row.get(5)?,
        error_message: row.get(6)?,
        created_at: row.get(7)?,
    })
}
