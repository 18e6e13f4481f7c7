use crate::error::{Result, StoreError};
use missive_core::domain::{Contact, ContactFields, ContactId};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Default)]
pub struct ContactNew {
    pub name: String,
    pub phone: String,
    pub fields: ContactFields,
}

pub struct ContactsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ContactsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: ContactNew) -> Result<Contact> {
        let tx = self.conn.unchecked_transaction()?;
        let contact = create_inner(&tx, now_utc, input)?;
        tx.commit()?;
        Ok(contact)
    }

    /// All-or-nothing: one invalid row rolls back the whole batch.
    pub fn create_many(&self, now_utc: i64, inputs: Vec<ContactNew>) -> Result<Vec<Contact>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut contacts = Vec::with_capacity(inputs.len());
        for input in inputs {
            contacts.push(create_inner(&tx, now_utc, input)?);
        }
        tx.commit()?;
        Ok(contacts)
    }

    pub fn get(&self, id: ContactId) -> Result<Option<Contact>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, phone, created_at FROM contacts WHERE id = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id_raw, name, phone, created_at)) = row else {
            return Ok(None);
        };

        let mut contact = Contact {
            id: parse_contact_id(&id_raw)?,
            name,
            phone,
            fields: ContactFields::new(),
            created_at,
        };
        contact.fields = fields_for_contact(self.conn, &id_raw)?;
        Ok(Some(contact))
    }

    /// Contacts in import order.
    pub fn list_all(&self) -> Result<Vec<Contact>> {
        let mut fields = all_fields(self.conn)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, name, phone, created_at
             FROM contacts
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            let id_raw: String = row.get(0)?;
            contacts.push(Contact {
                id: parse_contact_id(&id_raw)?,
                name: row.get(1)?,
                phone: row.get(2)?,
                fields: fields.remove(&id_raw).unwrap_or_default(),
                created_at: row.get(3)?,
            });
        }
        Ok(contacts)
    }

    pub fn list_by_ids(&self, ids: &[ContactId]) -> Result<Vec<Contact>> {
        let mut contacts = Vec::with_capacity(ids.len());
        for id in ids {
            let contact = self
                .get(*id)?
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            contacts.push(contact);
        }
        Ok(contacts)
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn delete(&self, id: ContactId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id.to_string()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM contact_fields;", [])?;
        let deleted = tx.execute("DELETE FROM contacts;", [])?;
        tx.commit()?;
        Ok(deleted)
    }
}

fn create_inner(conn: &Connection, now_utc: i64, input: ContactNew) -> Result<Contact> {
    let contact = Contact {
        id: ContactId::new(),
        name: input.name.trim().to_string(),
        phone: input.phone.trim().to_string(),
        fields: input.fields,
        created_at: now_utc,
    };

    contact.validate()?;

    let id = contact.id.to_string();
    conn.execute(
        "INSERT INTO contacts (id, name, phone, created_at) VALUES (?1, ?2, ?3, ?4);",
        params![id, contact.name, contact.phone, contact.created_at],
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO contact_fields (contact_id, key, value) VALUES (?1, ?2, ?3);",
    )?;
    for (key, value) in &contact.fields {
        stmt.execute(params![id, key, value])?;
    }

    Ok(contact)
}

fn fields_for_contact(conn: &Connection, contact_id: &str) -> Result<ContactFields> {
    let mut stmt = conn.prepare("SELECT key, value FROM contact_fields WHERE contact_id = ?1;")?;
    let mut rows = stmt.query([contact_id])?;
    let mut fields = ContactFields::new();
    while let Some(row) = rows.next()? {
        fields.insert(row.get(0)?, row.get(1)?);
    }
    Ok(fields)
}

fn all_fields(conn: &Connection) -> Result<HashMap<String, ContactFields>> {
    let mut stmt = conn.prepare("SELECT contact_id, key, value FROM contact_fields;")?;
    let mut rows = stmt.query([])?;
    let mut map: HashMap<String, ContactFields> = HashMap::new();
    while let Some(row) = rows.next()? {
        let contact_id: String = row.get(0)?;
        map.entry(contact_id)
            .or_default()
            .insert(row.get(1)?, row.get(2)?);
    }
    Ok(map)
}

fn parse_contact_id(raw: &str) -> Result<ContactId> {
    ContactId::from_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}
