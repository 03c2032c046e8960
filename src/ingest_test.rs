use super::*;

fn base_config() -> IngestConfig {
    IngestConfig::from_str(
        r#"
        ObsType = "Radiosonde"

        [window]
        begin = "2018-04-14T23:30:00Z"
        end = "2018-04-15T00:30:00Z"

        [obsdatain]
        obsfile = "radiosonde_obs_2018041500.nc4"
        "#,
    )
    .unwrap()
}

#[test]
fn test_infer_format() {
    let config = base_config();
    assert_eq!(infer_format("foo.nc4", &config), "netcdf");
    assert_eq!(infer_format("foo.h5", &config), "hdf5");
    assert_eq!(infer_format("foo", &config), "memory");
}

#[test]
fn test_infer_format_hdf5_image_when_memory_image_size_configured() {
    let mut config = base_config();
    config.hdf5_memory_image_initial_size = Some(4096);
    assert_eq!(infer_format("foo.h5", &config), "hdf5-image");
}

#[test]
fn test_build_distribution_dispatches_on_name() {
    let round_robin = build_distribution("roundrobin", 9, 1, 3).unwrap();
    assert_eq!(round_robin.owned(), &[1, 4, 7]);
    assert!(round_robin.is_record_atomic());

    let even_chunk = build_distribution("evenchunk", 10, 1, 3).unwrap();
    assert_eq!(even_chunk.owned(), &[4, 5, 6]);
    assert!(!even_chunk.is_record_atomic());

    let err = build_distribution("bogus", 10, 0, 1).unwrap_err();
    assert!(matches!(err, crate::Error::InvalidConfig(_)));
}
