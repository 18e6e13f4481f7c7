pub mod contacts;
pub mod message_logs;
pub mod templates;

pub use contacts::{ContactNew, ContactsRepo};
pub use message_logs::{LogQuery, MessageLogsRepo, DEFAULT_LOG_LIMIT};
pub use templates::{TemplatesRepo, DEFAULT_TEMPLATE_LIMIT};
