//! NetCDF-4 backend: opens legacy observation files.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info};

use super::{join_at_group, split_at_group, Backend, Capabilities, CreateMode, OpenMode};
use crate::cell::Cell;
use crate::err_at;
use crate::group::Group;
use crate::types::{Mode, Tag};
use crate::{Error, Result};

pub struct NetcdfBackend {
    root: Group,
    dim_names: BTreeMap<String, Vec<String>>,
    axis_sizes: BTreeMap<String, usize>,
    writer: Option<netcdf::FileMut>,
}

impl NetcdfBackend {
    pub fn open(path: &Path, mode: OpenMode) -> Result<NetcdfBackend> {
        info!(target: "ncdf  ", "{:?}, opening ...", path);
        let file = err_at!(BackendIOError, netcdf::open(path))?;

        let mut axis_sizes = BTreeMap::new();
        for dim in file.dimensions() {
            axis_sizes.insert(dim.name(), dim.len());
        }

        let mut root = Group::root();
        read_global_attrs(&file, &mut root)?;
        let mut dim_names = BTreeMap::new();

        for var in file.variables() {
            let on_disk_name = var.name();
            let (vname, gname) = split_at_group(&on_disk_name);
            let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
            let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
            let locations_dimensioned = dims.first().map(|d| d == "nlocs").unwrap_or(false);

            let tag = netcdf_tag(&var)?;
            let group = root.open_or_create(gname)?;
            let cell = read_netcdf_variable(&var, tag, &shape)?;
            let stored = group.variables_mut().create(
                vname,
                tag,
                shape,
                Mode::ReadOnly,
                locations_dimensioned,
                None,
            )?;
            stored.overwrite(stored.shape().to_vec(), cell)?;

            dim_names.insert(on_disk_name, dims);
        }

        let writer = match mode {
            OpenMode::ReadWrite => {
                Some(err_at!(BackendIOError, netcdf::append(path))?)
            }
            OpenMode::ReadOnly => None,
        };

        debug!(target: "ncdf  ", "{:?}, {} dimensions, {} variables", path, axis_sizes.len(), dim_names.len());
        Ok(NetcdfBackend { root, dim_names, axis_sizes, writer })
    }

    pub fn create(path: &Path, mode: CreateMode) -> Result<NetcdfBackend> {
        if mode == CreateMode::FailIfExists && path.exists() {
            return Err(Error::AlreadyExists(format!("{:?} already exists", path)));
        }
        info!(target: "ncdf  ", "{:?}, creating ({:?}) ...", path, mode);
        let writer = err_at!(BackendIOError, netcdf::create(path))?;
        Ok(NetcdfBackend {
            root: Group::root(),
            dim_names: BTreeMap::new(),
            axis_sizes: BTreeMap::new(),
            writer: Some(writer),
        })
    }
}

/// Copy the file's global (root-group) attributes in, so the time-window
/// filter can find `date_time`.
fn read_global_attrs(file: &netcdf::File, root: &mut Group) -> Result<()> {
    use netcdf::AttrValue;
    for attr in file.attributes() {
        let name = attr.name();
        let value = match err_at!(BackendIOError, attr.value()) {
            Ok(v) => v,
            Err(_) => continue,
        };
        match value {
            AttrValue::Int(v) => {
                root.attributes_mut().create(&name, Tag::I32, vec![])?.cell_mut().write_range(0, &Cell::I32(vec![v]))?;
            }
            AttrValue::Float(v) => {
                root.attributes_mut().create(&name, Tag::F32, vec![])?.cell_mut().write_range(0, &Cell::F32(vec![v]))?;
            }
            AttrValue::Double(v) => {
                root.attributes_mut().create(&name, Tag::F32, vec![])?.cell_mut().write_range(0, &Cell::F32(vec![v as f32]))?;
            }
            AttrValue::Str(s) => {
                root.attributes_mut().create(&name, Tag::Str, vec![])?.cell_mut().write_range(0, &Cell::Str(vec![s]))?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn netcdf_tag(var: &netcdf::Variable) -> Result<Tag> {
    use netcdf::types::NcVariableType;
    match var.vartype() {
        NcVariableType::Int(_) => Ok(Tag::I32),
        NcVariableType::Float(_) => Ok(Tag::F32),
        NcVariableType::Double(_) => Ok(Tag::F32),
        NcVariableType::Char | NcVariableType::String => Ok(Tag::Str),
        other => err_at!(BackendIOError, msg: "unsupported netcdf type {:?}", other),
    }
}

fn read_netcdf_variable(var: &netcdf::Variable, tag: Tag, shape: &[usize]) -> Result<Cell> {
    match tag {
        Tag::I32 => {
            let data: Vec<i32> = err_at!(BackendIOError, var.values::<i32, _>(..))?.into_raw_vec();
            Ok(Cell::I32(data))
        }
        Tag::F32 => {
            // Doubles are coerced to single precision on ingest; the
            // time-window filter applies the missing-value rule, not
            // this layer.
            let data: Vec<f32> = err_at!(BackendIOError, var.values::<f32, _>(..))?.into_raw_vec();
            Ok(Cell::F32(data))
        }
        Tag::Str => {
            let data: Vec<String> = err_at!(BackendIOError, var.values::<String, _>(..))?.into_raw_vec();
            Ok(Cell::Str(data))
        }
        Tag::DateTime => err_at!(
            BackendIOError,
            msg: "netcdf backend does not encode a native datetime type"
        ),
    }
    .map(|cell| {
        debug_assert_eq!(cell.len(), shape.iter().product::<usize>());
        cell
    })
}

impl Backend for NetcdfBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            partial_io: true,
            attribute_rename: false,
            grouping: false,
            concurrent_readers: true,
        }
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
        let NetcdfBackend { root, writer, .. } = *self;
        let mut writer = match writer {
            Some(w) => w,
            None => return Ok(()),
        };

        let nlocs = root
            .variables()
            .iter()
            .map(|v| if v.is_locations_dimensioned() { v.shape().first().copied().unwrap_or(0) } else { 0 })
            .max()
            .unwrap_or(0);
        info!(target: "ncdf  ", "closing, writing nlocs={} ...", nlocs);
        err_at!(BackendIOError, writer.add_dimension("nlocs", nlocs))?;

        for var in root.variables().iter() {
            let on_disk_name = join_at_group(var.name(), "");
            write_one_variable(&mut writer, &on_disk_name, var)?;
        }
        for gname in root.list() {
            let group = root.open(&gname)?;
            for var in group.variables().iter() {
                let on_disk_name = join_at_group(var.name(), &gname);
                write_one_variable(&mut writer, &on_disk_name, var)?;
            }
        }

        Ok(())
    }
}

fn write_one_variable(writer: &mut netcdf::FileMut, name: &str, var: &crate::variable::Variable) -> Result<()> {
    match var.tag() {
        Tag::I32 => {
            let mut nc_var = err_at!(BackendIOError, writer.add_variable::<i32>(name, &["nlocs"]))?;
            err_at!(BackendIOError, nc_var.put_values(var.cell().as_i32()?, ..))?;
        }
        Tag::F32 => {
            let mut nc_var = err_at!(BackendIOError, writer.add_variable::<f32>(name, &["nlocs"]))?;
            err_at!(BackendIOError, nc_var.put_values(var.cell().as_f32()?, ..))?;
        }
        Tag::Str => {
            let mut nc_var = err_at!(BackendIOError, writer.add_variable::<String>(name, &["nlocs"]))?;
            err_at!(BackendIOError, nc_var.put_values(var.cell().as_str()?, ..))?;
        }
        Tag::DateTime => {
            return err_at!(
                BackendIOError,
                msg: "netcdf backend cannot persist a native datetime variable {:?}",
                name
            )
        }
    }
    Ok(())
}
