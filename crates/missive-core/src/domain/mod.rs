pub mod contact;
pub mod ids;
pub mod phone;
pub mod status;
pub mod template;

pub use contact::{is_reserved_field, Contact, ContactFields};
pub use ids::{ContactId, MessageLogId, TemplateId};
pub use phone::{normalize_phone, CountryCode, PhoneNormalizer, DEFAULT_COUNTRY_CODE};
pub use status::{MessageLog, SendStatus};
pub use template::{
    is_placeholder_identifier, placeholders, render, unresolved_placeholders, validate_template,
    Template,
};
