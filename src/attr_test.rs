use super::*;

#[test]
fn test_create_duplicate_fails() {
    let mut store = AttributeStore::new();
    store.create("date_time", Tag::I32, vec![]).unwrap();
    let err = store.create("date_time", Tag::I32, vec![]).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
}

#[test]
fn test_open_missing_fails() {
    let store = AttributeStore::new();
    assert!(matches!(store.open("nope").unwrap_err(), Error::NotFound(_)));
}

#[test]
fn test_rename() {
    let mut store = AttributeStore::new();
    store.create("a", Tag::I32, vec![]).unwrap();
    store.rename("a", "b").unwrap();
    assert!(!store.exists("a"));
    assert!(store.exists("b"));
    assert!(matches!(store.rename("nope", "c").unwrap_err(), Error::NotFound(_)));
}

#[test]
fn test_list_sorted() {
    let mut store = AttributeStore::new();
    store.create("zeta", Tag::I32, vec![]).unwrap();
    store.create("alpha", Tag::I32, vec![]).unwrap();
    assert_eq!(store.list(), vec!["alpha".to_string(), "zeta".to_string()]);
}

#[test]
fn test_remove_keeps_others_accessible() {
    let mut store = AttributeStore::new();
    store.create("a", Tag::I32, vec![]).unwrap();
    store.create("b", Tag::I32, vec![]).unwrap();
    store.create("c", Tag::I32, vec![]).unwrap();
    store.remove("a").unwrap();
    assert!(store.open("b").is_ok());
    assert!(store.open("c").is_ok());
    assert!(matches!(store.remove("a").unwrap_err(), Error::NotFound(_)));
}
