use super::*;

#[test]
fn test_create_and_open() {
    let mut root = Group::root();
    root.create("MetaData").unwrap();
    assert!(root.open("MetaData").is_ok());
    assert!(matches!(root.create("MetaData").unwrap_err(), Error::AlreadyExists(_)));
}

#[test]
fn test_nested_create() {
    let mut root = Group::root();
    root.create("a/b/c").unwrap();
    assert!(root.open("a/b/c").is_ok());
    assert_eq!(root.open("a").unwrap().list(), vec!["b".to_string()]);
}

#[test]
fn test_rejects_dot_segments() {
    let mut root = Group::root();
    assert!(matches!(root.create("a/./b").unwrap_err(), Error::InvalidConfig(_)));
    assert!(matches!(root.create("a/../b").unwrap_err(), Error::InvalidConfig(_)));
    assert!(matches!(root.create("a//b").unwrap_err(), Error::InvalidConfig(_)));
}

#[test]
fn test_open_or_create_materializes_missing() {
    let mut root = Group::root();
    let g = root.open_or_create("ObsValue").unwrap();
    g.variables_mut();
    assert!(root.open("ObsValue").is_ok());
}
