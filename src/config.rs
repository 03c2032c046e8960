//! Recognized configuration options for an ingest run.
//!
//! Parsed from TOML with `serde`: read the whole file to a string, hand
//! it to `toml::from_str`, wrap any error as `InvalidConfig`.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::backend::CompatBound;
use crate::err_at;
use crate::Result;

#[derive(Clone, Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "ObsType")]
    obs_type: String,
    window: RawWindow,
    #[serde(default = "default_distribution")]
    distribution: String,
    obsdatain: RawObsFile,
    obsdataout: Option<RawObsFile>,
    #[serde(default)]
    hdf5: RawHdf5,
}

#[derive(Clone, Debug, Deserialize)]
struct RawWindow {
    begin: String,
    end: String,
}

#[derive(Clone, Debug, Deserialize)]
struct RawObsFile {
    obsfile: String,
}

#[derive(Clone, Debug, Deserialize, Default)]
struct RawHdf5 {
    compatibility_range: Option<(String, String)>,
    memory_image_initial_size: Option<usize>,
    flush_on_close: Option<bool>,
}

fn default_distribution() -> String {
    "roundrobin".to_string()
}

/// The recognized options, resolved and validated.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub obs_type: String,
    pub window_begin: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub distribution: String,
    pub input_file: String,
    pub output_file: Option<String>,
    pub hdf5_compat_range: Option<(CompatBound, CompatBound)>,
    pub hdf5_memory_image_initial_size: Option<usize>,
    pub hdf5_flush_on_close: bool,
}

const KNOWN_OBS_TYPES: &[&str] = &["Radiosonde", "AMSUA", "GnssroBndNBAM", "Radiance", "Aircraft", "Satwind"];
const KNOWN_DISTRIBUTIONS: &[&str] = &["roundrobin", "evenchunk"];

fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ")
        .map_err(|e| crate::Error::InvalidConfig(format!("unparseable timestamp {:?}: {}", s, e)))
}

fn parse_compat_bound(s: &str) -> Result<CompatBound> {
    match s {
        "earliest" => Ok(CompatBound::Earliest),
        "V18" => Ok(CompatBound::V18),
        "V110" => Ok(CompatBound::V110),
        "V112" => Ok(CompatBound::V112),
        "latest" => Ok(CompatBound::Latest),
        other => err_at!(InvalidConfig, msg: "unknown hdf5 compatibility bound {:?}", other),
    }
}

impl IngestConfig {
    /// Load and validate a config from a TOML file. Unknown `ObsType`,
    /// unparseable window, or unknown distribution name all surface as
    /// `InvalidConfig`.
    pub fn load_toml(path: &Path) -> Result<IngestConfig> {
        let text = err_at!(InvalidConfig, fs::read_to_string(path))?;
        let raw: RawConfig = err_at!(InvalidConfig, toml::from_str(&text))?;
        IngestConfig::from_raw(raw)
    }

    pub fn from_str(text: &str) -> Result<IngestConfig> {
        let raw: RawConfig = err_at!(InvalidConfig, toml::from_str(text))?;
        IngestConfig::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<IngestConfig> {
        if !KNOWN_OBS_TYPES.contains(&raw.obs_type.as_str()) {
            return err_at!(InvalidConfig, msg: "unknown ObsType {:?}", raw.obs_type);
        }
        if !KNOWN_DISTRIBUTIONS.contains(&raw.distribution.as_str()) {
            return err_at!(InvalidConfig, msg: "unknown distribution {:?}", raw.distribution);
        }

        let window_begin = parse_timestamp(&raw.window.begin)?;
        let window_end = parse_timestamp(&raw.window.end)?;

        let hdf5_compat_range = match raw.hdf5.compatibility_range {
            Some((lo, hi)) => Some((parse_compat_bound(&lo)?, parse_compat_bound(&hi)?)),
            None => None,
        };

        Ok(IngestConfig {
            obs_type: raw.obs_type,
            window_begin,
            window_end,
            distribution: raw.distribution,
            input_file: raw.obsdatain.obsfile,
            output_file: raw.obsdataout.map(|o| o.obsfile),
            hdf5_compat_range,
            hdf5_memory_image_initial_size: raw.hdf5.memory_image_initial_size,
            hdf5_flush_on_close: raw.hdf5.flush_on_close.unwrap_or(false),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
