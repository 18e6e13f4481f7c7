//! Sequential fan-out of one template to many contacts.
//!
//! Sends happen strictly one at a time with a fixed pause between them. A
//! failed delivery is reported as an outcome and never ends the batch; callers
//! stop early by dropping the [`Dispatcher`] between contacts.

use crate::channel::{DeliveryError, DeliveryReceipt, MessageChannel};
use crate::domain::contact::Contact;
use crate::domain::ids::ContactId;
use crate::domain::phone::PhoneNormalizer;
use crate::domain::template::render;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub contact_id: ContactId,
    pub name: String,
    pub phone: String,
    pub message: String,
}

pub fn prepare_outbound(
    template: &str,
    contact: &Contact,
    normalizer: &PhoneNormalizer,
) -> OutboundMessage {
    OutboundMessage {
        contact_id: contact.id,
        name: contact.name.clone(),
        phone: normalizer.normalize(&contact.phone),
        message: render(template, contact),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    pub delay: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_SEND_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub outbound: OutboundMessage,
    pub result: Result<DeliveryReceipt, DeliveryError>,
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_contacts: usize,
    pub sent_count: usize,
    pub failed_count: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &DispatchOutcome) {
        if outcome.is_sent() {
            self.record_sent();
        } else {
            self.record_failed();
        }
    }

    pub fn record_sent(&mut self) {
        self.total_contacts += 1;
        self.sent_count += 1;
    }

    pub fn record_failed(&mut self) {
        self.total_contacts += 1;
        self.failed_count += 1;
    }

    pub fn message(&self) -> String {
        format!(
            "Sent {} messages successfully, {} failed",
            self.sent_count, self.failed_count
        )
    }
}

type Pause<'a> = Box<dyn FnMut(Duration) + 'a>;

pub struct Dispatcher<'a, C: MessageChannel> {
    template: &'a str,
    contacts: &'a [Contact],
    channel: C,
    normalizer: &'a PhoneNormalizer,
    policy: DispatchPolicy,
    pause: Pause<'a>,
    position: usize,
}

impl<'a, C: MessageChannel> Dispatcher<'a, C> {
    pub fn new(
        template: &'a str,
        contacts: &'a [Contact],
        channel: C,
        normalizer: &'a PhoneNormalizer,
        policy: DispatchPolicy,
    ) -> Self {
        Self {
            template,
            contacts,
            channel,
            normalizer,
            policy,
            pause: Box::new(thread::sleep),
            position: 0,
        }
    }

    /// Replaces the blocking sleep used between sends.
    pub fn with_pause(mut self, pause: impl FnMut(Duration) + 'a) -> Self {
        self.pause = Box::new(pause);
        self
    }

    pub fn remaining(&self) -> usize {
        self.contacts.len() - self.position
    }

    /// Waits out the inter-send delay (skipped for the first contact) and
    /// renders the next message without sending it.
    pub fn prepare_next(&mut self) -> Option<OutboundMessage> {
        let contact = self.contacts.get(self.position)?;
        if self.position > 0 && !self.policy.delay.is_zero() {
            (self.pause)(self.policy.delay);
        }
        self.position += 1;
        Some(prepare_outbound(self.template, contact, self.normalizer))
    }

    pub fn deliver(&self, outbound: OutboundMessage) -> DispatchOutcome {
        let result = self.channel.send(&outbound.phone, &outbound.message);
        DispatchOutcome { outbound, result }
    }
}

impl<C: MessageChannel> Iterator for Dispatcher<'_, C> {
    type Item = DispatchOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        let outbound = self.prepare_next()?;
        Some(self.deliver(outbound))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::{prepare_outbound, BatchSummary, DispatchPolicy, Dispatcher};
    use crate::channel::{DeliveryError, DeliveryReceipt, MessageChannel};
    use crate::domain::contact::{Contact, ContactFields};
    use crate::domain::ids::ContactId;
    use crate::domain::phone::PhoneNormalizer;
    use std::cell::RefCell;
    use std::time::Duration;

    struct RecordingChannel {
        fail_phone: Option<String>,
        sent: RefCell<Vec<(String, String)>>,
    }

    impl RecordingChannel {
        fn failing_on(phone: Option<&str>) -> Self {
            Self {
                fail_phone: phone.map(str::to_string),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl MessageChannel for RecordingChannel {
        fn name(&self) -> &str {
            "recording"
        }

        fn send(&self, phone: &str, text: &str) -> Result<DeliveryReceipt, DeliveryError> {
            self.sent
                .borrow_mut()
                .push((phone.to_string(), text.to_string()));
            if self.fail_phone.as_deref() == Some(phone) {
                return Err(DeliveryError::new("recipient unreachable"));
            }
            Ok(DeliveryReceipt::new(self.name()))
        }
    }

    fn contact(name: &str, phone: &str, company: &str) -> Contact {
        let mut fields = ContactFields::new();
        fields.insert("company".to_string(), company.to_string());
        Contact {
            id: ContactId::new(),
            name: name.to_string(),
            phone: phone.to_string(),
            fields,
            created_at: 0,
        }
    }

    fn roster() -> Vec<Contact> {
        vec![
            contact("Ann", "111-111-1111", "Acme"),
            contact("Bob", "222-222-2222", "Globex"),
            contact("Cy", "333-333-3333", "Initech"),
        ]
    }

    #[test]
    fn prepare_outbound_renders_and_normalizes() {
        let ann = contact("Ann", "123-456-7890", "Acme");
        let outbound = prepare_outbound(
            "Hi {name}, from {company}",
            &ann,
            &PhoneNormalizer::default(),
        );
        assert_eq!(outbound.phone, "911234567890");
        assert_eq!(outbound.message, "Hi Ann, from Acme");
        assert_eq!(outbound.contact_id, ann.id);
    }

    #[test]
    fn dispatcher_sends_in_order_with_pauses_between() {
        let contacts = roster();
        let channel = RecordingChannel::failing_on(None);
        let normalizer = PhoneNormalizer::default();
        let pauses = RefCell::new(Vec::new());
        let policy = DispatchPolicy {
            delay: Duration::from_millis(250),
        };

        let outcomes: Vec<_> = Dispatcher::new("Hi {name}", &contacts, &channel, &normalizer, policy)
            .with_pause(|delay| pauses.borrow_mut().push(delay))
            .collect();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|outcome| outcome.is_sent()));
        let sent = channel.sent.borrow();
        assert_eq!(sent[0], ("911111111111".to_string(), "Hi Ann".to_string()));
        assert_eq!(sent[2], ("913333333333".to_string(), "Hi Cy".to_string()));
        assert_eq!(*pauses.borrow(), vec![Duration::from_millis(250); 2]);
    }

    #[test]
    fn failure_does_not_stop_the_batch() {
        let contacts = roster();
        let channel = RecordingChannel::failing_on(Some("912222222222"));
        let normalizer = PhoneNormalizer::default();
        let policy = DispatchPolicy {
            delay: Duration::ZERO,
        };

        let mut summary = BatchSummary::default();
        let mut failed = Vec::new();
        for outcome in Dispatcher::new("{company}", &contacts, &channel, &normalizer, policy) {
            summary.record(&outcome);
            if let Err(err) = &outcome.result {
                failed.push((outcome.outbound.name.clone(), err.message().to_string()));
            }
        }

        assert_eq!(channel.sent.borrow().len(), 3);
        assert_eq!(
            failed,
            vec![("Bob".to_string(), "recipient unreachable".to_string())]
        );
        assert_eq!(summary.total_contacts, 3);
        assert_eq!(summary.sent_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.message(), "Sent 2 messages successfully, 1 failed");
    }

    #[test]
    fn dropping_the_dispatcher_stops_between_contacts() {
        let contacts = roster();
        let channel = RecordingChannel::failing_on(None);
        let normalizer = PhoneNormalizer::default();
        let policy = DispatchPolicy {
            delay: Duration::ZERO,
        };

        let mut dispatcher = Dispatcher::new("x", &contacts, &channel, &normalizer, policy);
        assert_eq!(dispatcher.size_hint(), (3, Some(3)));
        dispatcher.next().expect("first outcome");
        assert_eq!(dispatcher.remaining(), 2);
        drop(dispatcher);

        assert_eq!(channel.sent.borrow().len(), 1);
    }

    #[test]
    fn empty_contact_list_yields_nothing() {
        let channel = RecordingChannel::failing_on(None);
        let normalizer = PhoneNormalizer::default();
        let mut dispatcher = Dispatcher::new(
            "x",
            &[],
            &channel,
            &normalizer,
            DispatchPolicy::default(),
        );
        assert!(dispatcher.next().is_none());
    }
}
