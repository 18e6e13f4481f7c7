use missive_core::domain::{ContactId, MessageLogId, SendStatus};
use missive_core::CoreError;
use missive_store::error::StoreError;
use missive_store::repo::{ContactNew, LogQuery};
use missive_store::Store;

fn store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

#[test]
fn logs_move_from_pending_to_sent() {
    let store = store();
    let contact_id = ContactId::new();
    let pending = store
        .message_logs()
        .create_pending(100, contact_id, "911234567890", "Hi Ann")
        .expect("create pending");
    assert_eq!(pending.status, SendStatus::Pending);

    let sent = store
        .message_logs()
        .mark_sent(102, pending.id)
        .expect("mark sent");
    assert_eq!(sent.status, SendStatus::Sent);
    assert_eq!(sent.sent_at, Some(102));

    let loaded = store
        .message_logs()
        .get(pending.id)
        .expect("get")
        .expect("exists");
    assert_eq!(loaded, sent);
}

#[test]
fn logs_reject_second_transition() {
    let store = store();
    let pending = store
        .message_logs()
        .create_pending(100, ContactId::new(), "1", "Hi")
        .expect("create pending");
    store
        .message_logs()
        .mark_failed(pending.id, "unreachable")
        .expect("mark failed");

    let err = store
        .message_logs()
        .mark_sent(101, pending.id)
        .expect_err("terminal state");
    assert!(matches!(
        err,
        StoreError::Core(CoreError::InvalidStatusTransition {
            from: SendStatus::Failed,
            to: SendStatus::Sent,
        })
    ));

    let loaded = store
        .message_logs()
        .get(pending.id)
        .expect("get")
        .expect("exists");
    assert_eq!(loaded.status, SendStatus::Failed);
    assert_eq!(loaded.error_message.as_deref(), Some("unreachable"));
}

#[test]
fn logs_mark_unknown_id_is_not_found() {
    let store = store();
    let err = store
        .message_logs()
        .mark_sent(1, MessageLogId::new())
        .expect_err("missing");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn logs_list_filters_and_counts() {
    let store = store();
    let logs = store.message_logs();
    let a = logs
        .create_pending(100, ContactId::new(), "1", "a")
        .expect("pending");
    let b = logs
        .create_pending(101, ContactId::new(), "2", "b")
        .expect("pending");
    logs.create_pending(102, ContactId::new(), "3", "c")
        .expect("pending");
    logs.mark_sent(103, a.id).expect("sent");
    logs.mark_failed(b.id, "boom").expect("failed");

    let all = logs.list(LogQuery::default()).expect("list");
    let messages: Vec<&str> = all.iter().map(|log| log.message.as_str()).collect();
    assert_eq!(messages, vec!["c", "b", "a"]);

    let failed = logs
        .list(LogQuery {
            status: Some(SendStatus::Failed),
            limit: 10,
        })
        .expect("list failed");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, b.id);

    let limited = logs
        .list(LogQuery {
            status: None,
            limit: 1,
        })
        .expect("list limited");
    assert_eq!(limited.len(), 1);

    assert_eq!(
        logs.counts().expect("counts"),
        vec![
            (SendStatus::Pending, 1),
            (SendStatus::Sent, 1),
            (SendStatus::Failed, 1),
        ]
    );
}

#[test]
fn logs_survive_clearing_contacts() {
    let store = store();
    let ann = store
        .contacts()
        .create(
            1,
            ContactNew {
                name: "Ann".to_string(),
                phone: "1".to_string(),
                ..ContactNew::default()
            },
        )
        .expect("create contact");
    store
        .message_logs()
        .create_pending(2, ann.id, "1", "Hi Ann")
        .expect("pending");

    store.contacts().clear().expect("clear contacts");
    let logs = store
        .message_logs()
        .list(LogQuery::default())
        .expect("list");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].contact_id, ann.id);

    assert_eq!(store.message_logs().clear().expect("clear logs"), 1);
    assert!(store
        .message_logs()
        .list(LogQuery::default())
        .expect("list")
        .is_empty());
}
