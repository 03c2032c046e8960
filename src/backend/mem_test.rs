use super::*;
use crate::types::{Mode, Tag};

#[test]
fn test_mem_backend_round_trips_variable() {
    let mut backend = MemBackend::new();
    backend
        .root_mut()
        .variables_mut()
        .create("time", Tag::F32, vec![3], Mode::ReadWrite, true, None)
        .unwrap();
    assert!(backend.root().variables().exists("time"));
    Box::new(backend).close().unwrap();
}
