use crate::domain::ids::{ContactId, MessageLogId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Pending,
    Sent,
    Failed,
}

impl SendStatus {
    pub const ALL: [SendStatus; 3] = [SendStatus::Pending, SendStatus::Sent, SendStatus::Failed];

    pub fn as_str(self) -> &'static str {
        match self {
            SendStatus::Pending => "pending",
            SendStatus::Sent => "sent",
            SendStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, SendStatus::Pending)
    }

    /// `pending` is the only state with outgoing edges.
    pub fn transition(self, next: SendStatus) -> Result<SendStatus, CoreError> {
        match (self, next) {
            (SendStatus::Pending, SendStatus::Sent) | (SendStatus::Pending, SendStatus::Failed) => {
                Ok(next)
            }
            (from, to) => Err(CoreError::InvalidStatusTransition { from, to }),
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SendStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SendStatus::Pending),
            "sent" => Ok(SendStatus::Sent),
            "failed" => Ok(SendStatus::Failed),
            _ => Err(CoreError::InvalidSendStatus(s.to_string())),
        }
    }
}

/// One `(phone, rendered text, outcome)` record per send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    pub id: MessageLogId,
    pub contact_id: ContactId,
    pub phone: String,
    pub message: String,
    pub status: SendStatus,
    pub sent_at: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: i64,
}

impl MessageLog {
    pub fn pending(
        now_utc: i64,
        contact_id: ContactId,
        phone: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageLogId::new(),
            contact_id,
            phone: phone.into(),
            message: message.into(),
            status: SendStatus::Pending,
            sent_at: None,
            error_message: None,
            created_at: now_utc,
        }
    }

    pub fn mark_sent(&mut self, now_utc: i64) -> Result<(), CoreError> {
        self.status = self.status.transition(SendStatus::Sent)?;
        self.sent_at = Some(now_utc);
        self.error_message = None;
        Ok(())
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), CoreError> {
        self.status = self.status.transition(SendStatus::Failed)?;
        self.sent_at = None;
        self.error_message = Some(error.into());
        Ok(())
    }
}
