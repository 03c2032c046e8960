use super::*;
use crate::timewindow::make_instant;

fn space() -> ObsSpace {
    let _ = env_logger::builder().is_test(true).try_init();
    let start = make_instant(2018, 4, 15, 0, 0, 0).unwrap();
    let end = make_instant(2018, 4, 15, 1, 0, 0).unwrap();
    ObsSpace::new("amsua_n19", start, end)
}

#[test]
fn test_put_db_create_then_overwrite() {
    let mut s = space();
    s.put_db("MetaData", "latitude", vec![1.0f32, 2.0, 3.0]).unwrap();
    assert!(s.has("MetaData", "latitude"));
    s.put_db("MetaData", "latitude", vec![4.0f32, 5.0, 6.0]).unwrap();
    let got: Vec<f32> = s.get_db("MetaData", "latitude", 3).unwrap();
    assert_eq!(got, vec![4.0, 5.0, 6.0]);
}

#[test]
fn test_put_db_type_mismatch() {
    let mut s = space();
    s.put_db("MetaData", "latitude", vec![1.0f32]).unwrap();
    let err = s.put_db("MetaData", "latitude", vec![1i32]).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)));
}

#[test]
fn test_get_db_length_mismatch() {
    let mut s = space();
    s.put_db("MetaData", "latitude", vec![1.0f32, 2.0]).unwrap();
    let err = s.get_db::<f32>("MetaData", "latitude", 99).unwrap_err();
    assert!(matches!(err, Error::LengthMismatch(_)));
}

#[test]
fn test_store_to_db_append_preserves_index_entry() {
    let mut s = space();
    s.store_to_db("MetaData", "time", vec![0], Vec::<f32>::new(), false).unwrap();
    s.store_to_db("MetaData", "time", vec![2], vec![1.0f32, 2.0], true).unwrap();
    s.store_to_db("MetaData", "time", vec![1], vec![3.0f32], true).unwrap();
    let got: Vec<f32> = s.load_from_db("MetaData", "time", 0, None).unwrap();
    assert_eq!(got, vec![1.0, 2.0, 3.0]);
    assert_eq!(s.iter_by_insertion().count(), 1);
}

#[test]
fn test_load_from_db_partial_read() {
    let mut s = space();
    s.put_db("MetaData", "latitude", vec![10.0f32, 11.0, 12.0, 13.0]).unwrap();
    let got: Vec<f32> = s.load_from_db("MetaData", "latitude", 1, Some(2)).unwrap();
    assert_eq!(got, vec![11.0, 12.0]);
}

#[test]
fn test_insertion_order_stable_across_inserts() {
    let mut s = space();
    s.put_db("MetaData", "b", vec![1i32]).unwrap();
    s.put_db("MetaData", "a", vec![2i32]).unwrap();
    s.put_db("ObsValue", "z", vec![3i32]).unwrap();
    let names: Vec<_> = s.iter_by_insertion().map(|v| v.variable.to_string()).collect();
    assert_eq!(names, vec!["b", "a", "z"]);
}

#[test]
fn test_by_variable_alphabetical() {
    let mut s = space();
    s.put_db("MetaData", "zeta", vec![1i32]).unwrap();
    s.put_db("MetaData", "alpha", vec![2i32]).unwrap();
    let names: Vec<_> = s.iter_by_variable().map(|v| v.variable.to_string()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[test]
fn test_by_group_then_insertion_within_group() {
    let mut s = space();
    s.put_db("ObsValue", "b", vec![1i32]).unwrap();
    s.put_db("MetaData", "y", vec![2i32]).unwrap();
    s.put_db("MetaData", "x", vec![3i32]).unwrap();
    let pairs: Vec<_> = s.iter_by_group().map(|v| (v.group.to_string(), v.variable.to_string())).collect();
    assert_eq!(
        pairs,
        vec![
            ("MetaData".to_string(), "y".to_string()),
            ("MetaData".to_string(), "x".to_string()),
            ("ObsValue".to_string(), "b".to_string()),
        ]
    );
}

#[test]
fn test_datetimes_defaults_empty_and_is_settable() {
    let mut s = space();
    assert!(s.datetimes().is_empty());
    let dts = vec![DateTime::new(2018, 4, 15, 0, 0, 0), DateTime::new(2018, 4, 15, 0, 24, 0)];
    s.set_datetimes(dts.clone());
    assert_eq!(s.datetimes(), dts.as_slice());
}

#[test]
fn test_remove_unwinds_all_three_indices() {
    let mut s = space();
    s.put_db("MetaData", "b", vec![1i32]).unwrap();
    s.put_db("MetaData", "a", vec![2i32]).unwrap();
    s.put_db("ObsValue", "b", vec![3i32]).unwrap();

    s.remove("MetaData", "b").unwrap();
    assert!(!s.has("MetaData", "b"));
    assert!(s.has("MetaData", "a"));
    assert!(s.has("ObsValue", "b"));

    let insertion: Vec<_> = s.iter_by_insertion().map(|v| (v.group.to_string(), v.variable.to_string())).collect();
    assert_eq!(insertion, vec![("MetaData".to_string(), "a".to_string()), ("ObsValue".to_string(), "b".to_string())]);

    let by_group: Vec<_> = s.iter_by_group().map(|v| (v.group.to_string(), v.variable.to_string())).collect();
    assert_eq!(by_group, vec![("MetaData".to_string(), "a".to_string()), ("ObsValue".to_string(), "b".to_string())]);

    let by_variable: Vec<_> = s.iter_by_variable().map(|v| (v.group.to_string(), v.variable.to_string())).collect();
    assert_eq!(by_variable, vec![("MetaData".to_string(), "a".to_string()), ("ObsValue".to_string(), "b".to_string())]);

    let got: Vec<i32> = s.get_db("MetaData", "a", 1).unwrap();
    assert_eq!(got, vec![2]);

    assert!(matches!(s.remove("MetaData", "b").unwrap_err(), Error::NotFound(_)));
}

#[test]
fn test_on_disk_name_round_trip() {
    assert_eq!(ObsSpace::on_disk_name("ObsValue", "air_temperature"), "air_temperature@ObsValue");
    let (v, g) = ObsSpace::split_on_disk_name("air_temperature@ObsValue");
    assert_eq!((v, g), ("air_temperature", "ObsValue"));
}
