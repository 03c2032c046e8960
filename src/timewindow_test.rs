use super::*;

#[test]
fn test_scenario_time_filter() {
    let begin = make_instant(2018, 4, 15, 0, 0, 0).unwrap();
    let end = make_instant(2018, 4, 15, 0, 30, 0).unwrap();
    let outcome = apply(Some(2018041500), &[-0.6, -0.4, 0.0, 0.4, 0.6], begin, end).unwrap();
    assert_eq!(outcome.retained, vec![2, 3]);
    assert_eq!(outcome.derived_date, vec![20180415, 20180415]);
    assert_eq!(outcome.derived_time, vec![0, 2400]);
    assert_eq!(
        outcome.derived_datetime,
        vec![DateTime::new(2018, 4, 15, 0, 0, 0), DateTime::new(2018, 4, 15, 0, 24, 0)]
    );
}

#[test]
fn test_scenario_legacy_radiance_window() {
    let begin = make_instant(2018, 4, 14, 23, 30, 0).unwrap();
    let end = make_instant(2018, 4, 15, 0, 30, 0).unwrap();
    let offsets = vec![0.0; 20];
    let outcome = apply(Some(2018041500), &offsets, begin, end).unwrap();
    assert_eq!(outcome.retained.len(), 20);
}

#[test]
fn test_missing_date_time_retains_all_without_derivation() {
    let begin = make_instant(2018, 4, 15, 0, 0, 0).unwrap();
    let end = make_instant(2018, 4, 15, 1, 0, 0).unwrap();
    let outcome = apply(None, &[0.0, 1.0, 2.0], begin, end).unwrap();
    assert_eq!(outcome.retained, vec![0, 1, 2]);
    assert!(outcome.derived_date.is_empty());
}

#[test]
fn test_window_is_half_open_lower_exclusive() {
    let begin = make_instant(2018, 4, 15, 0, 0, 0).unwrap();
    let end = make_instant(2018, 4, 15, 0, 0, 0).unwrap();
    // offset 0.0 lands exactly on both begin and end; begin < t <= end
    // excludes it since begin == t here.
    let outcome = apply(Some(2018041500), &[0.0], begin, end).unwrap();
    assert!(outcome.retained.is_empty());
}

#[test]
fn test_missing_value_substitution_is_asymmetric() {
    let mut values = [1.0f32, 1.0e9, -2.0];
    substitute_missing(&mut values);
    assert_eq!(values, [1.0, MISSING_VALUE, -2.0]);

    let mut negative = [-1.0e9f32];
    substitute_missing(&mut negative);
    assert_eq!(negative, [-1.0e9]);
}
