use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Proof that a channel accepted a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub channel: String,
    pub reference: Option<String>,
}

impl DeliveryReceipt {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DeliveryError {
    message: String,
}

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Transport that hands one rendered message to one phone number.
pub trait MessageChannel {
    fn name(&self) -> &str;

    fn send(&self, phone: &str, text: &str) -> Result<DeliveryReceipt, DeliveryError>;
}

impl<C: MessageChannel + ?Sized> MessageChannel for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&self, phone: &str, text: &str) -> Result<DeliveryReceipt, DeliveryError> {
        (**self).send(phone, text)
    }
}

impl<C: MessageChannel + ?Sized> MessageChannel for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&self, phone: &str, text: &str) -> Result<DeliveryReceipt, DeliveryError> {
        (**self).send(phone, text)
    }
}
