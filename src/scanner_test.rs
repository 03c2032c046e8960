use super::*;

fn axes(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
    pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn test_modern_file_uses_nlocs_directly() {
    let (nlocs, nvars) = resolve_axis_sizes(&axes(&[("nlocs", 5), ("nrecs", 5), ("nvars", 4)])).unwrap();
    assert_eq!((nlocs, nvars), (5, 4));
}

#[test]
fn test_legacy_divides_nobs_by_nchans() {
    let (nlocs, nvars) = resolve_axis_sizes(&axes(&[("nobs", 20), ("nchans", 4)])).unwrap();
    assert_eq!((nlocs, nvars), (5, 4));
}

#[test]
fn test_legacy_without_nchans_is_single_var() {
    let (nlocs, nvars) = resolve_axis_sizes(&axes(&[("nobs", 7)])).unwrap();
    assert_eq!((nlocs, nvars), (7, 1));
}

#[test]
fn test_legacy_non_divisible_fails() {
    let err = resolve_axis_sizes(&axes(&[("nobs", 10), ("nchans", 3)])).unwrap_err();
    assert!(matches!(err, crate::Error::InvalidConfig(_)));
}

#[test]
fn test_locations_dimensioned_from_dims() {
    let mut scan = ScanResult::default();
    scan.dims_attached_to_vars.insert("latitude".to_string(), vec!["nlocs".to_string()]);
    scan.dims_attached_to_vars.insert("brightness".to_string(), vec!["nlocs".to_string(), "nvars".to_string()]);
    assert!(is_locations_dimensioned(&scan, "latitude", 1, false));
    assert!(is_locations_dimensioned(&scan, "brightness", 2, false));
}

#[test]
fn test_locations_dimensioned_legacy_fallback() {
    let scan = ScanResult::default();
    assert!(is_locations_dimensioned(&scan, "latitude", 1, true));
    assert!(!is_locations_dimensioned(&scan, "matrix", 2, true));
    assert!(!is_locations_dimensioned(&scan, "latitude", 1, false));
}
