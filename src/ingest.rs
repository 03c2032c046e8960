//! Ingest/save orchestration: opens a backend, runs scanner -> distribution
//! -> time filter -> store on load, and the inverse on save.

use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;

use crate::backend::{open_backend, Backend, Hdf5Options, OpenMode};
use crate::cell::Cell;
use crate::comm::Comm;
use crate::config::IngestConfig;
use crate::distribution::{Distribution, EvenChunk, RoundRobin};
use crate::group::Group;
use crate::obsspace::ObsSpace;
use crate::scanner;
use crate::timewindow;
use crate::Result;

/// Every on-disk variable the scanner/ingest loop needs to visit:
/// `(group, variable)`, `""` group meaning the unnamed root group
/// (`GroupUndefined`).
fn enumerate_variables(root: &Group) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = root.variables().list().into_iter().map(|v| (String::new(), v)).collect();
    for gname in root.list() {
        if let Ok(group) = root.open(&gname) {
            for vname in group.variables().list() {
                out.push((gname.clone(), vname));
            }
        }
    }
    out
}

fn on_disk_names(vars: &[(String, String)]) -> Vec<String> {
    vars.iter().map(|(g, v)| crate::backend::join_at_group(v, g)).collect()
}

fn read_column(backend: &dyn Backend, group: &str, variable: &str) -> Result<(Vec<usize>, Cell)> {
    let node = if group.is_empty() { backend.root() } else { backend.root().open(group)? };
    let var = node.variables().open(variable)?;
    let shape = var.shape().to_vec();
    let selection = crate::variable::full_selection(&shape);
    Ok((shape, var.read_range(&selection)?))
}

fn read_root_attr_i32(backend: &dyn Backend, name: &str) -> Option<i32> {
    backend.root().attributes().open(name).ok().and_then(|a| a.cell().as_i32().ok().and_then(|v| v.first().copied()))
}

/// Load sequence: open the backend, scan its variables, distribute
/// locations across ranks, apply the time window, then project and store
/// every variable onto this rank's owned locations.
pub fn load(config: &IngestConfig, comm: &dyn Comm) -> Result<ObsSpace> {
    let format = infer_format(&config.input_file, config);
    info!(target: "ingest", "{:?}, opening {:?} as {} ...", config.obs_type, config.input_file, format);
    let backend = open_backend(&format, Path::new(&config.input_file), OpenMode::ReadOnly, hdf5_options(config))?;

    let variables = enumerate_variables(backend.root());
    let names = on_disk_names(&variables);
    let scan = scanner::scan(backend.as_ref(), &names)?;
    debug!(target: "ingest", "{:?}, scanned {} variables, nlocs={} nvars={}", config.obs_type, names.len(), scan.nlocs, scan.nvars);

    let is_legacy = !backend.axis_sizes().contains_key("nrecs");

    let mut dist = build_distribution(&config.distribution, scan.nlocs, comm.rank(), comm.size())?;
    info!(
        target: "ingest",
        "{:?}, rank {}/{}, {} of {} locations owned before time filter",
        config.obs_type,
        comm.rank(),
        comm.size(),
        dist.owned().len(),
        scan.nlocs
    );

    let date_time_attr = read_root_attr_i32(backend.as_ref(), "date_time");
    let time_on_disk = if variables.iter().any(|(g, v)| v == "time" && g == "MetaData") {
        ("MetaData".to_string(), "time".to_string())
    } else {
        (String::new(), "time".to_string())
    };
    let filter_outcome = match read_column(backend.as_ref(), &time_on_disk.0, &time_on_disk.1) {
        Ok((_, cell)) => {
            let offsets = cell.as_f32()?.to_vec();
            timewindow::apply(date_time_attr, &offsets, config.window_begin, config.window_end)?
        }
        Err(_) => timewindow::FilterOutcome {
            retained: (0..scan.nlocs).collect(),
            derived_date: Vec::new(),
            derived_time: Vec::new(),
            derived_datetime: Vec::new(),
        },
    };

    let retained_set: std::collections::HashSet<usize> = filter_outcome.retained.iter().copied().collect();
    let mut dropped = 0usize;
    for i in 0..scan.nlocs {
        if !retained_set.contains(&i) {
            dist.erase(i);
            dropped += 1;
        }
    }
    info!(target: "ingest", "{:?}, time window dropped {} of {} locations", config.obs_type, dropped, scan.nlocs);

    // filter_outcome.derived_datetime is parallel to filter_outcome.retained
    // (every retained *global* index, across all ranks), so it needs its
    // own projection onto this rank's owned set rather than reuse of
    // `Cell::project` (which assumes its source is already parallel to
    // `owned`).
    let datetime_by_index: std::collections::HashMap<usize, crate::types::DateTime> =
        filter_outcome.retained.iter().copied().zip(filter_outcome.derived_datetime.iter().copied()).collect();

    let window_start = config.window_begin;
    let window_end = config.window_end;
    let mut space = ObsSpace::new(&config.obs_type, window_start, window_end);
    space.set_nvars(scan.nvars);

    let owned = dist.owned().to_vec();

    // Read every variable's full column in parallel, then project/insert
    // sequentially: the ObsSpace itself is single-threaded.
    let columns: Vec<Result<(String, String, Vec<usize>, Cell)>> = variables
        .par_iter()
        .map(|(group, variable)| {
            let (shape, cell) = read_column(backend.as_ref(), group, variable)?;
            Ok((group.clone(), variable.clone(), shape, cell))
        })
        .collect();

    for result in columns {
        let (group, variable, shape, mut cell) = result?;
        let on_disk = crate::backend::join_at_group(&variable, &group);
        let locations_dimensioned = scanner::is_locations_dimensioned(&scan, &on_disk, shape.len(), is_legacy);

        if let Cell::F32(values) = &mut cell {
            timewindow::substitute_missing(values);
        }

        let projected = if locations_dimensioned {
            let row_stride: usize = shape.iter().skip(1).product::<usize>().max(1);
            cell.project(&owned, row_stride)
        } else {
            cell
        };
        let mut projected_shape = shape;
        if locations_dimensioned && !projected_shape.is_empty() {
            projected_shape[0] = owned.len();
        }

        insert_projected(&mut space, &group, &variable, projected_shape, projected, locations_dimensioned)?;
    }

    space.set_nlocs(owned.len());
    if !datetime_by_index.is_empty() {
        space.set_datetimes(owned.iter().map(|i| datetime_by_index[i]).collect());
    }
    info!(target: "ingest", "{:?}, loaded {} variables, nlocs={}", config.obs_type, variables.len(), owned.len());
    Ok(space)
}

fn insert_projected(
    space: &mut ObsSpace,
    group: &str,
    variable: &str,
    shape: Vec<usize>,
    cell: Cell,
    locations_dimensioned: bool,
) -> Result<()> {
    match cell {
        Cell::I32(v) => space.insert_read_only::<i32>(group, variable, shape, v, locations_dimensioned),
        Cell::F32(v) => space.insert_read_only::<f32>(group, variable, shape, v, locations_dimensioned),
        Cell::Str(v) => space.insert_read_only::<String>(group, variable, shape, v, locations_dimensioned),
        Cell::DateTime(v) => space.insert_read_only::<crate::types::DateTime>(group, variable, shape, v, locations_dimensioned),
    }
}

/// Save sequence: open write-truncate, write every variable through the
/// backend.
pub fn save(space: &ObsSpace, config: &IngestConfig) -> Result<()> {
    let output = config
        .output_file
        .as_ref()
        .ok_or_else(|| crate::Error::InvalidConfig("obsdataout.obsfile not configured".to_string()))?;
    let format = infer_format(output, config);
    info!(target: "ingest", "{:?}, saving to {:?} as {} ({} variables) ...", config.obs_type, output, format, space.iter_by_insertion().count());
    space.save(Path::new(output), &format, hdf5_options(config))
}

/// Instantiate the distribution policy named by `config.distribution`
/// (validated against the known set at config-parse time; see
/// `config::KNOWN_DISTRIBUTIONS`). `"evenchunk"` ignores any record-group
/// vector and declares no record atomicity, matching `EvenChunk`'s
/// contract.
fn build_distribution(name: &str, n: usize, rank: usize, total_ranks: usize) -> Result<Box<dyn Distribution>> {
    match name {
        "roundrobin" => Ok(Box::new(RoundRobin::new(n, rank, total_ranks, None)?)),
        "evenchunk" => Ok(Box::new(EvenChunk::new(n, rank, total_ranks)?)),
        other => Err(crate::Error::InvalidConfig(format!("unknown distribution {:?}", other))),
    }
}

/// Build the `Hdf5Options` the backend factory needs from the recognized
/// `hdf5.*` config options, so `compatibility_range`, `flush_on_close` and
/// `memory_image_initial_size` actually reach `Hdf5Backend`/`Hdf5Image`
/// instead of being parsed and discarded.
fn hdf5_options(config: &IngestConfig) -> Hdf5Options {
    Hdf5Options {
        compat_range: config.hdf5_compat_range,
        memory_image_initial_size: config.hdf5_memory_image_initial_size,
        flush_on_close: config.hdf5_flush_on_close,
    }
}

/// `.h5` picks the HDF5 backend: a memory image when
/// `hdf5.memory_image_initial_size` was configured, otherwise a plain
/// file. `.nc`/`.nc4` picks NetCDF; anything else falls back to the pure
/// in-memory backend.
fn infer_format(path: &str, config: &IngestConfig) -> String {
    if path.ends_with(".h5") {
        if config.hdf5_memory_image_initial_size.is_some() {
            "hdf5-image".to_string()
        } else {
            "hdf5".to_string()
        }
    } else if path.ends_with(".nc") || path.ends_with(".nc4") {
        "netcdf".to_string()
    } else {
        "memory".to_string()
    }
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod ingest_test;
