pub mod channel;
pub mod dispatch;
pub mod domain;
pub mod dto;
pub mod error;

pub use channel::{DeliveryError, DeliveryReceipt, MessageChannel};
pub use dispatch::{BatchSummary, DispatchOutcome, DispatchPolicy, Dispatcher, OutboundMessage};
pub use domain::*;
pub use dto::*;
pub use error::CoreError;
