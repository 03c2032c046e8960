use super::*;

const VALID: &str = r#"
    ObsType = "Radiosonde"

    [window]
    begin = "2018-04-14T23:30:00Z"
    end = "2018-04-15T00:30:00Z"

    [obsdatain]
    obsfile = "radiosonde_obs_2018041500.nc4"

    [obsdataout]
    obsfile = "radiosonde_obs_2018041500_out.nc4"
"#;

#[test]
fn test_parses_valid_config() {
    let cfg = IngestConfig::from_str(VALID).unwrap();
    assert_eq!(cfg.obs_type, "Radiosonde");
    assert_eq!(cfg.distribution, "roundrobin");
    assert_eq!(cfg.input_file, "radiosonde_obs_2018041500.nc4");
    assert_eq!(cfg.output_file.as_deref(), Some("radiosonde_obs_2018041500_out.nc4"));
}

#[test]
fn test_unknown_obs_type_is_invalid_config() {
    let text = VALID.replacen("Radiosonde", "NotARealObsType", 1);
    let err = IngestConfig::from_str(&text).unwrap_err();
    assert!(matches!(err, crate::Error::InvalidConfig(_)));
}

#[test]
fn test_unparseable_window_is_invalid_config() {
    let text = VALID.replace("2018-04-14T23:30:00Z", "not-a-timestamp");
    let err = IngestConfig::from_str(&text).unwrap_err();
    assert!(matches!(err, crate::Error::InvalidConfig(_)));
}
