use missive_core::domain::TemplateId;
use missive_store::error::StoreError;
use missive_store::repo::DEFAULT_TEMPLATE_LIMIT;
use missive_store::Store;

fn store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

#[test]
fn templates_save_and_get() {
    let store = store();
    let saved = store
        .templates()
        .save(100, "Hi {name}, from {company}. Bye {name}!")
        .expect("save");
    assert_eq!(saved.placeholders, vec!["name", "company"]);

    let loaded = store
        .templates()
        .get(saved.id)
        .expect("get")
        .expect("exists");
    assert_eq!(loaded, saved);
    assert!(store
        .templates()
        .get(TemplateId::new())
        .expect("get")
        .is_none());
}

#[test]
fn templates_list_newest_first() {
    let store = store();
    store.templates().save(100, "first").expect("save");
    store.templates().save(200, "second {x}").expect("save");
    store.templates().save(200, "third").expect("save");

    let items = store
        .templates()
        .list(DEFAULT_TEMPLATE_LIMIT)
        .expect("list");
    let contents: Vec<&str> = items.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["third", "second {x}", "first"]);
    assert!(items[2].placeholders.is_empty());

    let latest = store.templates().latest().expect("latest").expect("some");
    assert_eq!(latest.content, "third");
}

#[test]
fn templates_reject_blank_content() {
    let store = store();
    let err = store.templates().save(1, "   ").expect_err("blank");
    assert!(matches!(err, StoreError::Core(_)));
    assert!(store.templates().latest().expect("latest").is_none());
}
