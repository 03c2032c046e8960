use super::*;

#[test]
fn test_shape_len() {
    assert_eq!(shape_len(&[5]), 5);
    assert_eq!(shape_len(&[5, 4]), 20);
    assert_eq!(shape_len(&[]), 1);
}

#[test]
fn test_date_time_ints() {
    let dt = DateTime::new(2018, 4, 15, 0, 24, 0);
    assert_eq!(dt.as_date_int(), 20180415);
    assert_eq!(dt.as_time_int(), 2400);
}
