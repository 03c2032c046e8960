//! Time-window filter: converts a file-level reference timestamp plus a
//! per-observation hour offset into absolute timestamps, retains only
//! those inside `(begin, end]`, and derives integer date/time fields for
//! the survivors.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::err_at;
use crate::types::DateTime;
use crate::Result;

/// Missing-value sentinel substituted for out-of-range floats.
pub const MISSING_VALUE: f32 = 9.969_210e36;

/// Outcome of filtering one `time` column against a window.
#[derive(Clone, Debug, Default)]
pub struct FilterOutcome {
    /// Global indices retained, ascending.
    pub retained: Vec<usize>,
    /// `date_i`/`time_i` parallel to `retained`; empty when the file had
    /// no `date_time` attribute, in which case all indices are retained
    /// and no derived date/time fields are produced.
    pub derived_date: Vec<i32>,
    pub derived_time: Vec<i32>,
    /// The same derived instant as the store's broken-down-timestamp
    /// primitive, parallel to `retained`. This is the form
    /// [`crate::ingest::load`] actually surfaces per location, since
    /// `derived_date`/`derived_time` are a read-back convenience, not a
    /// second encoding callers are expected to carry around.
    pub derived_datetime: Vec<DateTime>,
}

/// Parse the scalar `date_time` attribute (`yyyymmddhh`) into the
/// reference instant.
fn reference_instant(date_time: i32) -> Result<NaiveDateTime> {
    let ymd = date_time / 100;
    let hh = date_time % 100;
    let year = ymd / 10000;
    let month = (ymd / 100) % 100;
    let day = ymd % 100;
    let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .ok_or_else(|| crate::Error::InvalidConfig(format!("invalid date_time attribute {}", date_time)))?;
    Ok(date.and_hms_opt(0, 0, 0).unwrap() + Duration::seconds(hh as i64 * 3600))
}

fn to_crate_datetime(t: NaiveDateTime) -> DateTime {
    DateTime::new(
        t.date().year(),
        t.date().month() as u8,
        t.date().day() as u8,
        t.time().hour() as u8,
        t.time().minute() as u8,
        t.time().second() as u8,
    )
}

use chrono::Datelike;
use chrono::Timelike;

/// Resolve each observation's absolute timestamp and retain only the
/// ones inside the window. `offsets_hours` is the `time`/`time@MetaData`
/// column (length `N`); `begin`/`end` bound the half-open,
/// lower-exclusive retention window.
pub fn apply(
    date_time: Option<i32>,
    offsets_hours: &[f32],
    begin: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<FilterOutcome> {
    let ref_instant = match date_time {
        Some(dt) => reference_instant(dt)?,
        None => {
            return Ok(FilterOutcome {
                retained: (0..offsets_hours.len()).collect(),
                derived_date: Vec::new(),
                derived_time: Vec::new(),
                derived_datetime: Vec::new(),
            })
        }
    };

    let mut retained = Vec::new();
    let mut derived_date = Vec::new();
    let mut derived_time = Vec::new();
    let mut derived_datetime = Vec::new();

    for (i, &offset) in offsets_hours.iter().enumerate() {
        let seconds = (offset as f64 * 3600.0).round() as i64;
        let t_i = ref_instant + Duration::seconds(seconds);
        if begin < t_i && t_i <= end {
            retained.push(i);
            let dt = to_crate_datetime(t_i);
            derived_date.push(dt.as_date_int());
            derived_time.push(dt.as_time_int());
            derived_datetime.push(dt);
        }
    }

    Ok(FilterOutcome { retained, derived_date, derived_time, derived_datetime })
}

/// Missing-value substitution for a float column: `x > 1.0e8` is
/// replaced by [`MISSING_VALUE`]. This is intentionally asymmetric: very
/// negative values are never substituted. Kept exactly this way rather
/// than "fixed" to `|x| > 1.0e8`.
pub fn substitute_missing(values: &mut [f32]) {
    for v in values.iter_mut() {
        if *v > 1.0e8 {
            *v = MISSING_VALUE;
        }
    }
}

/// Build a `NaiveDateTime` window bound from a `yyyymmddhhmmss`-style
/// broken-down timestamp, for callers (config parsing, tests) that don't
/// already hold a `chrono` type.
pub fn make_instant(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Result<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| crate::Error::InvalidConfig(format!("invalid date {}-{}-{}", year, month, day)))?;
    date.and_hms_opt(hour, minute, second)
        .ok_or_else(|| crate::Error::InvalidConfig(format!("invalid time {}:{}:{}", hour, minute, second)))
}

#[cfg(test)]
#[path = "timewindow_test.rs"]
mod timewindow_test;
