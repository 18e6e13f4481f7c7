use crate::error::{Result, StoreError};
use missive_core::domain::{Template, TemplateId};
use rusqlite::{params, Connection};
use std::str::FromStr;

pub const DEFAULT_TEMPLATE_LIMIT: i64 = 100;

const PLACEHOLDER_SEPARATOR: char = ',';

pub struct TemplatesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> TemplatesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, now_utc: i64, content: &str) -> Result<Template> {
        let template = Template::new(now_utc, content)?;
        self.conn.execute(
            "INSERT INTO templates (id, content, placeholders, created_at) VALUES (?1, ?2, ?3, ?4);",
            params![
                template.id.to_string(),
                template.content,
                join_placeholders(&template.placeholders),
                template.created_at,
            ],
        )?;
        Ok(template)
    }

    pub fn get(&self, id: TemplateId) -> Result<Option<Template>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, content, placeholders, created_at FROM templates WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(template_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Newest first.
    pub fn list(&self, limit: i64) -> Result<Vec<Template>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, content, placeholders, created_at
             FROM templates
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([limit])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(template_from_row(row)?);
        }
        Ok(items)
    }

    pub fn latest(&self) -> Result<Option<Template>> {
        Ok(self.list(1)?.into_iter().next())
    }
}

fn join_placeholders(placeholders: &[String]) -> String {
    placeholders.join(&PLACEHOLDER_SEPARATOR.to_string())
}

fn split_placeholders(raw: &str) -> Vec<String> {
    raw.split(PLACEHOLDER_SEPARATOR)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn template_from_row(row: &rusqlite::Row<'_>) -> Result<Template> {
    let id_str: String = row.get(0)?;
    let id = TemplateId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let placeholders_raw: String = row.get(2)?;
    Ok(Template {
        id,
        content: row.get(1)?,
        placeholders: split_placeholders(&placeholders_raw),
        created_at: row.get(3)?,
    })
}
