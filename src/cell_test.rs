use super::*;

#[test]
fn test_write_range_type_mismatch() {
    let mut cell = Cell::new(Tag::I32, 4);
    let data = Cell::F32(vec![1.0, 2.0]);
    let err = cell.write_range(0, &data).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)));
}

#[test]
fn test_write_range_out_of_range() {
    let mut cell = Cell::new(Tag::I32, 4);
    let data = Cell::I32(vec![1, 2, 3]);
    let err = cell.write_range(2, &data).unwrap_err();
    assert!(matches!(err, Error::OutOfRange(_)));
}

#[test]
fn test_segmented_write_equivalence() {
    // Storing segments (0,2),(2,1),(3,2) must equal a single whole
    // range store.
    let whole = Cell::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    let mut segmented = Cell::new(Tag::F32, 5);
    segmented.write_range(0, &Cell::F32(vec![1.0, 2.0])).unwrap();
    segmented.write_range(2, &Cell::F32(vec![3.0])).unwrap();
    segmented.write_range(3, &Cell::F32(vec![4.0, 5.0])).unwrap();

    assert_eq!(whole, segmented);
}

#[test]
fn test_segmented_read_equivalence() {
    let cell = Cell::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    let mut reloaded = vec![];
    for (start, count) in [(0usize, 2usize), (2, 2), (4, 1)] {
        reloaded.extend_from_slice(cell.read_range(start, count).unwrap().as_f32().unwrap());
    }
    assert_eq!(reloaded, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_project_rank1() {
    let cell = Cell::I32(vec![10, 11, 12, 13, 14]);
    let projected = cell.project(&[1, 3, 4], 1);
    assert_eq!(projected.as_i32().unwrap(), &[11, 13, 14]);
}

#[test]
fn test_project_multi_column_keeps_whole_rows() {
    // shape [5, 4] row-major: row i occupies [4i, 4i+4).
    let cell = Cell::F32((0..20).map(|v| v as f32).collect());
    let projected = cell.project(&[0, 2], 4);
    assert_eq!(projected.as_f32().unwrap(), &[0.0, 1.0, 2.0, 3.0, 8.0, 9.0, 10.0, 11.0]);
}
