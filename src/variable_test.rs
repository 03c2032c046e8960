use super::*;

#[test]
fn test_rank1_write_read_range() {
    let mut store = VariableStore::new();
    store.create("time", Tag::F32, vec![5], Mode::ReadWrite, true, None).unwrap();
    let var = store.open_mut("time").unwrap();
    var.write_range(&vec![(0, 5)], &Cell::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();

    let read = var.read_range(&vec![(1, 2)]).unwrap();
    assert_eq!(read.as_f32().unwrap(), &[2.0, 3.0]);
}

#[test]
fn test_segmented_append_then_segmented_read_equals_whole() {
    let mut store = VariableStore::new();
    store.create("v", Tag::F32, vec![0], Mode::ReadWrite, true, None).unwrap();
    let var = store.open_mut("v").unwrap();

    var.append_leading(2, Cell::F32(vec![1.0, 2.0])).unwrap();
    var.append_leading(1, Cell::F32(vec![3.0])).unwrap();
    var.append_leading(2, Cell::F32(vec![4.0, 5.0])).unwrap();
    assert_eq!(var.shape(), &[5]);

    let mut reloaded = vec![];
    for (start, count) in [(0usize, 2usize), (2, 2), (4, 1)] {
        reloaded.extend_from_slice(
            var.read_range(&vec![(start, count)]).unwrap().as_f32().unwrap(),
        );
    }
    assert_eq!(reloaded, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_rank2_hyperslab() {
    // shape [3, 4], row-major; select rows [1,3), cols [1,3)
    let mut store = VariableStore::new();
    store.create("m", Tag::I32, vec![3, 4], Mode::ReadWrite, false, None).unwrap();
    let var = store.open_mut("m").unwrap();
    let full: Vec<i32> = (0..12).collect();
    var.write_range(&full_selection(&[3, 4]), &Cell::I32(full)).unwrap();

    let sub = var.read_range(&vec![(1, 2), (1, 2)]).unwrap();
    // rows 1,2 are [4,5,6,7] and [8,9,10,11]; cols 1,2 -> [5,6] and [9,10]
    assert_eq!(sub.as_i32().unwrap(), &[5, 6, 9, 10]);
}

#[test]
fn test_out_of_range_selection() {
    let mut store = VariableStore::new();
    store.create("v", Tag::I32, vec![4], Mode::ReadWrite, true, None).unwrap();
    let var = store.open_mut("v").unwrap();
    let err = var.read_range(&vec![(2, 4)]).unwrap_err();
    assert!(matches!(err, Error::OutOfRange(_)));
}

#[test]
fn test_overwrite_type_frozen() {
    let mut store = VariableStore::new();
    store.create("v", Tag::I32, vec![2], Mode::ReadWrite, true, None).unwrap();
    let var = store.open_mut("v").unwrap();
    let err = var.overwrite(vec![2], Cell::F32(vec![1.0, 2.0])).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)));
}

#[test]
fn test_overwrite_rejects_length_mismatch() {
    let mut store = VariableStore::new();
    store.create("brightness", Tag::F32, vec![5, 4], Mode::ReadWrite, true, None).unwrap();
    let var = store.open_mut("brightness").unwrap();
    // shape [3, 4] implies 12 values; only 3 supplied.
    let err = var.overwrite(vec![3, 4], Cell::F32(vec![1.0, 2.0, 3.0])).unwrap_err();
    assert!(matches!(err, Error::LengthMismatch(_)));
}
