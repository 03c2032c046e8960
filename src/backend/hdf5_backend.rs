//! HDF5 backends: a plain file and an in-process memory image that may
//! optionally be flushed to disk on close.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info};

use super::{join_at_group, split_at_group, Backend, Capabilities, CompatBound, CompatRange, CreateMode, OpenMode};
use crate::cell::Cell;
use crate::err_at;
use crate::group::Group;
use crate::types::{Mode, Tag};
use crate::variable::Variable;
use crate::{Error, Result};

/// HDF5-specific knobs recognized by config.
#[derive(Clone, Copy, Debug)]
pub struct Hdf5Config {
    pub compat_range: CompatRange,
    /// Initial buffer size for the memory-image variant, in bytes.
    pub memory_image_initial_size: usize,
    /// Growth increment for the memory-image variant, in bytes.
    pub memory_image_growth_increment: usize,
    pub flush_on_close: bool,
}

impl Default for Hdf5Config {
    fn default() -> Self {
        Hdf5Config {
            compat_range: (CompatBound::Earliest, CompatBound::Latest),
            memory_image_initial_size: 1 << 20,
            memory_image_growth_increment: 1 << 20,
            flush_on_close: false,
        }
    }
}

fn libver(bound: CompatBound) -> hdf5::file::LibraryVersion {
    use hdf5::file::LibraryVersion as V;
    match bound {
        CompatBound::Earliest => V::Earliest,
        CompatBound::V18 => V::V18,
        CompatBound::V110 => V::V110,
        CompatBound::V112 => V::V112,
        CompatBound::Latest => V::Latest,
    }
}

/// Copy the file's root-level attributes in, so the time-window filter
/// can find `date_time`.
fn read_global_attrs(file: &hdf5::File, root: &mut Group) -> Result<()> {
    for name in err_at!(BackendIOError, file.attr_names())? {
        let attr = match err_at!(BackendIOError, file.attr(&name)) {
            Ok(a) => a,
            Err(_) => continue,
        };
        if let Ok(v) = attr.read_scalar::<i32>() {
            root.attributes_mut().create(&name, Tag::I32, vec![])?.cell_mut().write_range(0, &Cell::I32(vec![v]))?;
        } else if let Ok(v) = attr.read_scalar::<f32>() {
            root.attributes_mut().create(&name, Tag::F32, vec![])?.cell_mut().write_range(0, &Cell::F32(vec![v]))?;
        } else if let Ok(v) = attr.read_scalar::<hdf5::types::VarLenUnicode>() {
            root.attributes_mut().create(&name, Tag::Str, vec![])?.cell_mut().write_range(0, &Cell::Str(vec![v.as_str().to_string()]))?;
        }
    }
    Ok(())
}

fn load_into_group(file: &hdf5::File) -> Result<(Group, BTreeMap<String, Vec<String>>, BTreeMap<String, usize>)> {
    let mut root = Group::root();
    read_global_attrs(file, &mut root)?;
    let mut dim_names = BTreeMap::new();
    let mut axis_sizes = BTreeMap::new();

    for dataset in err_at!(BackendIOError, file.datasets())? {
        let on_disk_name = dataset.name();
        let (vname, gname) = split_at_group(&on_disk_name);
        let shape = dataset.shape();
        let dims = err_at!(BackendIOError, dataset.attr("DIMENSION_LIST"))
            .ok()
            .map(|_| Vec::<String>::new())
            .unwrap_or_else(|| axis_names_by_shape(&shape, &axis_sizes));
        let locations_dimensioned = dims.first().map(|d| d == "nlocs").unwrap_or(false);

        let tag = hdf5_tag(&dataset)?;
        let cell = read_hdf5_dataset(&dataset, tag)?;
        let group = root.open_or_create(gname)?;
        let stored = group.variables_mut().create(
            vname,
            tag,
            shape.clone(),
            Mode::ReadOnly,
            locations_dimensioned,
            None,
        )?;
        stored.overwrite(stored.shape().to_vec(), cell)?;

        for (name, len) in shape.iter().enumerate().map(|(i, &l)| (format!("dim{}", i), l)) {
            axis_sizes.entry(name).or_insert(len);
        }
        dim_names.insert(on_disk_name, dims);
    }

    Ok((root, dim_names, axis_sizes))
}

/// Best-effort dimension-name recovery for datasets that don't carry
/// HDF5 dimension scales: match each extent against a known axis size.
/// Falls back to an empty dim list, in which case the scanner treats the
/// variable via the legacy (`nrecs`-absent) heuristic.
fn axis_names_by_shape(shape: &[usize], axis_sizes: &BTreeMap<String, usize>) -> Vec<String> {
    shape
        .iter()
        .map(|&extent| {
            axis_sizes
                .iter()
                .find(|(_, &len)| len == extent)
                .map(|(name, _)| name.clone())
                .unwrap_or_default()
        })
        .collect()
}

fn hdf5_tag(dataset: &hdf5::Dataset) -> Result<Tag> {
    use hdf5::types::TypeDescriptor as T;
    match dataset.dtype().map(|d| d.to_descriptor()) {
        Ok(Ok(T::Integer(_))) => Ok(Tag::I32),
        Ok(Ok(T::Float(_))) => Ok(Tag::F32),
        Ok(Ok(T::VarLenUnicode)) | Ok(Ok(T::FixedUnicode(_))) => Ok(Tag::Str),
        other => err_at!(BackendIOError, msg: "unsupported hdf5 dtype {:?}", other),
    }
}

fn read_hdf5_dataset(dataset: &hdf5::Dataset, tag: Tag) -> Result<Cell> {
    match tag {
        Tag::I32 => Ok(Cell::I32(err_at!(BackendIOError, dataset.read_raw::<i32>())?)),
        Tag::F32 => Ok(Cell::F32(err_at!(BackendIOError, dataset.read_raw::<f32>())?)),
        Tag::Str => {
            let raw: Vec<hdf5::types::VarLenUnicode> =
                err_at!(BackendIOError, dataset.read_raw())?;
            Ok(Cell::Str(raw.into_iter().map(|s| s.as_str().to_string()).collect()))
        }
        Tag::DateTime => {
            err_at!(BackendIOError, msg: "hdf5 backend does not encode a native datetime type")
        }
    }
}

fn write_group_to_file(file: &hdf5::File, root: &Group) -> Result<()> {
    write_group_variables(file, root, "")?;
    for gname in root.list() {
        let group = root.open(&gname)?;
        write_group_variables(file, group, &gname)?;
    }
    Ok(())
}

fn write_group_variables(file: &hdf5::File, group: &Group, gname: &str) -> Result<()> {
    for var in group.variables().iter() {
        let on_disk_name = join_at_group(var.name(), gname);
        write_one_dataset(file, &on_disk_name, var)?;
    }
    Ok(())
}

fn write_one_dataset(file: &hdf5::File, name: &str, var: &Variable) -> Result<()> {
    match var.tag() {
        Tag::I32 => {
            let builder = err_at!(BackendIOError, file.new_dataset::<i32>().shape(var.shape().to_vec()).create(name))?;
            err_at!(BackendIOError, builder.write_raw(var.cell().as_i32()?))
        }
        Tag::F32 => {
            let builder = err_at!(BackendIOError, file.new_dataset::<f32>().shape(var.shape().to_vec()).create(name))?;
            err_at!(BackendIOError, builder.write_raw(var.cell().as_f32()?))
        }
        Tag::Str => {
            let values: Vec<hdf5::types::VarLenUnicode> = var
                .cell()
                .as_str()?
                .iter()
                .map(|s| s.parse().unwrap_or_default())
                .collect();
            let builder = err_at!(
                BackendIOError,
                file.new_dataset::<hdf5::types::VarLenUnicode>().shape(var.shape().to_vec()).create(name)
            )?;
            err_at!(BackendIOError, builder.write_raw(&values))
        }
        Tag::DateTime => err_at!(
            BackendIOError,
            msg: "hdf5 backend cannot persist a native datetime variable {:?}",
            name
        ),
    }
}

/// Modern HDF5 file backend.
pub struct Hdf5Backend {
    root: Group,
    dim_names: BTreeMap<String, Vec<String>>,
    axis_sizes: BTreeMap<String, usize>,
    file: Option<hdf5::File>,
}

impl Hdf5Backend {
    pub fn open(path: &Path, _mode: OpenMode) -> Result<Hdf5Backend> {
        info!(target: "hdf5  ", "{:?}, opening ...", path);
        let file = err_at!(BackendIOError, hdf5::File::open(path))?;
        let (root, dim_names, axis_sizes) = load_into_group(&file)?;
        debug!(target: "hdf5  ", "{:?}, {} dimensions, {} variables", path, axis_sizes.len(), dim_names.len());
        Ok(Hdf5Backend { root, dim_names, axis_sizes, file: Some(file) })
    }

    pub fn create(path: &Path, mode: CreateMode, config: Hdf5Config) -> Result<Hdf5Backend> {
        if mode == CreateMode::FailIfExists && path.exists() {
            return Err(Error::AlreadyExists(format!("{:?} already exists", path)));
        }
        info!(target: "hdf5  ", "{:?}, creating ({:?}) ...", path, mode);
        let (low, high) = config.compat_range;
        let file = err_at!(
            BackendIOError,
            hdf5::File::with_options()
                .libver_bounds(libver(low), libver(high))
                .create(path)
        )?;
        Ok(Hdf5Backend { root: Group::root(), dim_names: BTreeMap::new(), axis_sizes: BTreeMap::new(), file: Some(file) })
    }
}

impl Backend for Hdf5Backend {
    fn capabilities(&self) -> Capabilities {
        Capabilities { partial_io: true, attribute_rename: true, grouping: true, concurrent_readers: true }
    }

    fn root(&self) -> &Group {
        &self.root
    }

    fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    fn dim_names(&self, variable: &str) -> Vec<String> {
        self.dim_names.get(variable).cloned().unwrap_or_default()
    }

    fn axis_sizes(&self) -> BTreeMap<String, usize> {
        self.axis_sizes.clone()
    }

    fn close(self: Box<Self>) -> Result<()> {
        let Hdf5Backend { root, file, .. } = *self;
        if let Some(file) = file {
            info!(target: "hdf5  ", "closing, writing {} root variables ...", root.variables().iter().count());
            write_group_to_file(&file, &root)?;
        }
        Ok(())
    }
}

/// In-process HDF5 memory image, optionally flushed to disk on close.
pub struct Hdf5Image {
    root: Group,
    dim_names: BTreeMap<String, Vec<String>>,
    axis_sizes: BTreeMap<String, usize>,
    file: Option<hdf5::File>,
    path: Option<std::path::PathBuf>,
    flush_on_close: bool,
}

impl Hdf5Image {
    pub fn create(path: Option<&Path>, config: Hdf5Config) -> Result<Hdf5Image> {
        let file = err_at!(
            BackendIOError,
            hdf5::File::with_options()
                .core_filebacked(config.flush_on_close)
                .core_filebacked_increment(config.memory_image_growth_increment)
                .create(path.unwrap_or_else(|| Path::new("image.h5")))
        )?;
        Ok(Hdf5Image {
            root: Group::root(),
            dim_names: BTreeMap::new(),
            axis_sizes: BTreeMap::new(),
            file: Some(file),
            path: path.map(|p| p.to_path_buf()),
            flush_on_close: config.flush_on_close,
        })
    }

    pub fn from_buffer(buf: &[u8]) -> Result<Hdf5Image> {
        let file = err_at!(BackendIOError, hdf5::File::from_buffer(buf))?;
        let (root, dim_names, axis_sizes) = load_into_group(&file)?;
        Ok(Hdf5Image { root, dim_names, axis_sizes, file: Some(file), path: None, flush_on_close: false })
    }
}

impl Backend for Hdf5Image {
    fn capabilities(&self) -> Capabilities {
        Capabilities { partial_io: true, attribute_rename: true, grouping: true, concurrent_readers: false }
    }

    fn root(&self) -> &Group {
        &self.root
    }

    fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    fn dim_names(&self, variable: &str) -> Vec<String> {
        self.dim_names.get(variable).cloned().unwrap_or_default()
    }

    fn axis_sizes(&self) -> BTreeMap<String, usize> {
        self.axis_sizes.clone()
    }

    fn close(self: Box<Self>) -> Result<()> {
        let Hdf5Image { root, file, path, flush_on_close, .. } = *self;
        let file = match file {
            Some(f) => f,
            None => return Ok(()),
        };
        write_group_to_file(&file, &root)?;
        if flush_on_close && path.is_some() {
            err_at!(BackendIOError, file.flush())?;
        }
        Ok(())
    }
}
