use crate::domain::ids::ContactId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extra CSV columns keyed by column header.
pub type ContactFields = BTreeMap<String, String>;

const RESERVED_FIELDS: [&str; 3] = ["name", "phone", "number"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub fields: ContactFields,
    pub created_at: i64,
}

impl Contact {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::EmptyContactName);
        }

        if self.phone.trim().is_empty() {
            return Err(CoreError::EmptyPhone);
        }

        if let Some(key) = self.fields.keys().find(|key| key.eq_ignore_ascii_case("name")) {
            return Err(CoreError::ReservedFieldName(key.clone()));
        }

        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Columns that map onto `Contact::name` / `Contact::phone` and never land in `fields`.
pub fn is_reserved_field(key: &str) -> bool {
    let trimmed = key.trim();
    RESERVED_FIELDS
        .iter()
        .any(|reserved| trimmed.eq_ignore_ascii_case(reserved))
}

#[cfg(test)]
mod tests {
    use super::{is_reserved_field, Contact, ContactFields};
    use crate::domain::ids::ContactId;
    use crate::error::CoreError;

    fn contact(name: &str, phone: &str, fields: &[(&str, &str)]) -> Contact {
        Contact {
            id: ContactId::new(),
            name: name.to_string(),
            phone: phone.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<ContactFields>(),
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn validate_accepts_basic_contact() {
        let value = contact("Ann", "123-456-7890", &[("company", "Acme")]);
        assert!(value.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let value = contact("   ", "123", &[]);
        assert_eq!(value.validate(), Err(CoreError::EmptyContactName));
    }

    #[test]
    fn validate_rejects_blank_phone() {
        let value = contact("Ann", " ", &[]);
        assert_eq!(value.validate(), Err(CoreError::EmptyPhone));
    }

    #[test]
    fn validate_rejects_name_in_fields() {
        let value = contact("Ann", "123", &[("Name", "Bob")]);
        assert_eq!(
            value.validate(),
            Err(CoreError::ReservedFieldName("Name".to_string()))
        );
    }

    #[test]
    fn reserved_fields_match_case_insensitively() {
        assert!(is_reserved_field("name"));
        assert!(is_reserved_field(" PHONE "));
        assert!(is_reserved_field("Number"));
        assert!(!is_reserved_field("company"));
    }
}
