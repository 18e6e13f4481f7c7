use crate::domain::ids::ContactId;
use crate::domain::status::SendStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactListItemDto {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewDto {
    pub contact_id: ContactId,
    pub name: String,
    pub phone: String,
    pub message: String,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCountDto {
    pub status: SendStatus,
    pub count: i64,
}
