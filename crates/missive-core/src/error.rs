use crate::domain::status::SendStatus;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("contact name is required")]
    EmptyContactName,
    #[error("contact phone is required")]
    EmptyPhone,
    #[error("reserved field name: {0}")]
    ReservedFieldName(String),
    #[error("message template is empty")]
    EmptyTemplate,
    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),
    #[error("invalid send status transition: {from} -> {to}")]
    InvalidStatusTransition { from: SendStatus, to: SendStatus },
    #[error("invalid send status: {0}")]
    InvalidSendStatus(String),
}
