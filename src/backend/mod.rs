//! Uniform Group/Variable/Attribute interface over NetCDF, HDF5 (file and
//! in-memory image) and a pure in-memory backend.
//!
//! Every backend implementation ultimately produces or consumes a
//! [`crate::group::Group`] tree: on open/load it fills one in from the
//! on-disk format, on create/save it walks one out to the on-disk format.
//! This keeps the ingestion/scan/distribution/filter pipeline entirely
//! decoupled from which concrete format backs a given run: they all just
//! see a `Group`.

mod mem;

#[cfg(feature = "netcdf")]
mod netcdf_backend;
#[cfg(feature = "hdf5")]
mod hdf5_backend;

pub use mem::MemBackend;
#[cfg(feature = "netcdf")]
pub use netcdf_backend::NetcdfBackend;
#[cfg(feature = "hdf5")]
pub use hdf5_backend::{Hdf5Backend, Hdf5Config, Hdf5Image};

use std::path::Path;

use crate::err_at;
use crate::group::Group;
use crate::{Error, Result};

/// How a backend should behave if the target already exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateMode {
    FailIfExists,
    Truncate,
}

/// How a backend should be opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
}

/// HDF5 library/file format compatibility window, reported as a (low,
/// high) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompatBound {
    Earliest,
    V18,
    V110,
    V112,
    Latest,
}

pub type CompatRange = (CompatBound, CompatBound);

impl Default for CompatBound {
    fn default() -> Self {
        CompatBound::Latest
    }
}

/// HDF5-specific knobs parsed from [`crate::config::IngestConfig`],
/// kept here (ungated by the `hdf5` feature) so the factory functions
/// below can accept them unconditionally. Ignored unless `format` picks
/// an HDF5-backed variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hdf5Options {
    pub compat_range: Option<CompatRange>,
    pub memory_image_initial_size: Option<usize>,
    pub flush_on_close: bool,
}

/// What a concrete backend supports; reported once per instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub partial_io: bool,
    pub attribute_rename: bool,
    pub grouping: bool,
    pub concurrent_readers: bool,
}

/// A backend that has been opened or created. Holds the in-memory `Group`
/// tree plus whatever the concrete implementation needs to flush it back
/// out (a file handle, a memory image, nothing at all for the pure
/// in-memory variant).
///
/// File handles are exclusively owned by the backend and released
/// (RAII: acquired on open/create, released on every exit path including
/// failure) when the backend value is dropped or `close` is called
/// explicitly.
pub trait Backend: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    fn root(&self) -> &Group;
    fn root_mut(&mut self) -> &mut Group;

    /// Flush any in-memory changes to the underlying medium (file,
    /// memory image); a no-op for read-only or pure in-memory backends.
    /// Consumes `self` so the handle cannot be used afterwards, matching
    /// the RAII discipline the rest of this crate follows for file
    /// ownership.
    fn close(self: Box<Self>) -> Result<()>;

    /// On-disk dimension names attached to `variable`, outermost first, as
    /// the scanner needs to decide whether a variable is
    /// locations-dimensioned. Backends that don't track dimension names
    /// (the pure in-memory backend) report none.
    fn dim_names(&self, _variable: &str) -> Vec<String> {
        Vec::new()
    }

    /// Sizes of every named dimension defined by the file.
    fn axis_sizes(&self) -> std::collections::BTreeMap<String, usize> {
        Default::default()
    }
}

#[cfg(feature = "hdf5")]
fn resolve_hdf5_config(opts: Hdf5Options) -> crate::backend::Hdf5Config {
    let mut cfg = crate::backend::Hdf5Config::default();
    if let Some(range) = opts.compat_range {
        cfg.compat_range = range;
    }
    if let Some(size) = opts.memory_image_initial_size {
        cfg.memory_image_initial_size = size;
    }
    cfg.flush_on_close = opts.flush_on_close;
    cfg
}

/// Open a backend registered under `format`: `"memory"`, `"netcdf"`,
/// `"hdf5"` (a plain file) or `"hdf5-image"` (a memory image loaded
/// whole from disk). `hdf5_opts` is ignored by every format but the
/// HDF5-backed ones.
pub fn open_backend(format: &str, path: &Path, mode: OpenMode, hdf5_opts: Hdf5Options) -> Result<Box<dyn Backend>> {
    match format {
        "memory" => Ok(Box::new(MemBackend::new())),
        #[cfg(feature = "netcdf")]
        "netcdf" => Ok(Box::new(NetcdfBackend::open(path, mode)?)),
        #[cfg(feature = "hdf5")]
        "hdf5" => Ok(Box::new(Hdf5Backend::open(path, mode)?)),
        #[cfg(feature = "hdf5")]
        "hdf5-image" => {
            let buf = err_at!(BackendIOError, std::fs::read(path))?;
            Ok(Box::new(Hdf5Image::from_buffer(&buf)?))
        }
        other => Err(Error::InvalidConfig(format!("unknown backend format {:?}", other))),
    }
}

/// Create a backend registered under `format`, same names as
/// [`open_backend`]. `"hdf5-image"` builds the image file-backed at
/// `path`, so `Hdf5Options::flush_on_close` controls whether `close`
/// leaves a readable file behind.
pub fn create_backend(format: &str, path: &Path, mode: CreateMode, hdf5_opts: Hdf5Options) -> Result<Box<dyn Backend>> {
    match format {
        "memory" => Ok(Box::new(MemBackend::new())),
        #[cfg(feature = "netcdf")]
        "netcdf" => Ok(Box::new(NetcdfBackend::create(path, mode)?)),
        #[cfg(feature = "hdf5")]
        "hdf5" => Ok(Box::new(Hdf5Backend::create(path, mode, resolve_hdf5_config(hdf5_opts))?)),
        #[cfg(feature = "hdf5")]
        "hdf5-image" => {
            if mode == CreateMode::FailIfExists && path.exists() {
                return Err(Error::AlreadyExists(format!("{:?} already exists", path)));
            }
            Ok(Box::new(Hdf5Image::create(Some(path), resolve_hdf5_config(hdf5_opts))?))
        }
        other => Err(Error::InvalidConfig(format!("unknown backend format {:?}", other))),
    }
}

/// Split the legacy on-disk naming convention `name@group` into
/// `(variable, group)`. A variable with no `@` lives in the unnamed root
/// group (`GroupUndefined`).
pub fn split_at_group(on_disk_name: &str) -> (&str, &str) {
    match on_disk_name.rfind('@') {
        Some(pos) => (&on_disk_name[..pos], &on_disk_name[pos + 1..]),
        None => (on_disk_name, ""),
    }
}

/// Join a variable name with its group into the on-disk convention
/// `name@group`, or just `name` when the group is the root
/// (`GroupUndefined`).
pub fn join_at_group(variable: &str, group: &str) -> String {
    if group.is_empty() {
        variable.to_string()
    } else {
        format!("{}@{}", variable, group)
    }
}
