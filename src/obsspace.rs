//! ObsSpace: the typed, multi-indexed in-memory database keyed by
//! `(group, variable)`.
//!
//! Storage follows a "one owning vector plus index overlays" design:
//! entries never move once pushed, so the index overlays can hold plain
//! arena indices instead of duplicating records.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::backend::{create_backend, join_at_group, split_at_group, CreateMode, Hdf5Options};
use crate::cell::Primitive;
use crate::types::{DateTime, Mode, Shape, Tag};
use crate::variable::{full_selection, Variable};
use crate::{Error, Result};

struct Entry {
    group: String,
    variable: Variable,
}

/// Read-only view of one entry, yielded by the iterator ranges.
#[derive(Clone, Copy, Debug)]
pub struct VariableView<'a> {
    pub group: &'a str,
    pub variable: &'a str,
    pub shape: &'a [usize],
    pub tag: Tag,
}

/// The in-memory database a single rank populates during ingest and
/// persists on save.
pub struct ObsSpace {
    obsname: String,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
    nlocs: usize,
    nvars: usize,
    /// Per-location broken-down timestamp derived by the time-window
    /// filter, parallel to this rank's owned, post-filter location order.
    /// Empty when the source file carried no `date_time` attribute. Kept
    /// out of the `(group, variable)` grid deliberately: it is derived,
    /// read-only-at-the-source data that no backend is asked to persist
    /// on `save` (the NetCDF/HDF5 backends have no native encoding for
    /// `Tag::DateTime`; see their `write_one_variable`), unlike every
    /// other loaded column.
    datetimes: Vec<DateTime>,

    entries: Vec<Entry>,
    /// Primary index: `(group, variable)` -> arena index. Unique.
    primary: HashMap<(String, String), usize>,
    /// By-group index: group -> arena indices, insertion order within
    /// group.
    by_group: BTreeMap<String, Vec<usize>>,
    /// By-variable index: variable name -> arena indices, insertion
    /// order among entries sharing that name.
    by_variable: BTreeMap<String, Vec<usize>>,
}

impl ObsSpace {
    pub fn new(obsname: &str, window_start: NaiveDateTime, window_end: NaiveDateTime) -> ObsSpace {
        ObsSpace {
            obsname: obsname.to_string(),
            window_start,
            window_end,
            nlocs: 0,
            nvars: 1,
            datetimes: Vec::new(),
            entries: Vec::new(),
            primary: HashMap::new(),
            by_group: BTreeMap::new(),
            by_variable: BTreeMap::new(),
        }
    }

    pub fn obsname(&self) -> &str {
        &self.obsname
    }

    pub fn window_start(&self) -> NaiveDateTime {
        self.window_start
    }

    pub fn window_end(&self) -> NaiveDateTime {
        self.window_end
    }

    pub fn nlocs(&self) -> usize {
        self.nlocs
    }

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    /// Called once by the ingest orchestration after the time filter has
    /// run.
    pub fn set_nlocs(&mut self, nlocs: usize) {
        self.nlocs = nlocs;
    }

    pub fn set_nvars(&mut self, nvars: usize) {
        self.nvars = nvars;
    }

    /// Per-location derived timestamp, in the same order as `nlocs` and
    /// every locations-dimensioned variable.
    /// Empty when the source carried no `date_time` attribute.
    pub fn datetimes(&self) -> &[DateTime] {
        &self.datetimes
    }

    /// Called once by the ingest orchestration with the owned, post-filter
    /// projection of the time filter's derived timestamps.
    pub fn set_datetimes(&mut self, datetimes: Vec<DateTime>) {
        self.datetimes = datetimes;
    }

    pub fn has(&self, group: &str, variable: &str) -> bool {
        self.primary.contains_key(&(group.to_string(), variable.to_string()))
    }

    fn entry(&self, group: &str, variable: &str) -> Result<&Entry> {
        let idx = *self
            .primary
            .get(&(group.to_string(), variable.to_string()))
            .ok_or_else(|| Error::NotFound(format!("({:?}, {:?}) not found", group, variable)))?;
        Ok(&self.entries[idx])
    }

    fn entry_mut(&mut self, group: &str, variable: &str) -> Result<&mut Entry> {
        let idx = *self
            .primary
            .get(&(group.to_string(), variable.to_string()))
            .ok_or_else(|| Error::NotFound(format!("({:?}, {:?}) not found", group, variable)))?;
        Ok(&mut self.entries[idx])
    }

    /// Insert a brand-new entry and wire up all three indices. Panics if
    /// the primary key already exists: callers must check `has` first,
    /// since the primary index is required to stay unique.
    fn insert_new(&mut self, group: &str, variable: &str, var: Variable) {
        let idx = self.entries.len();
        self.entries.push(Entry { group: group.to_string(), variable: var });
        self.primary.insert((group.to_string(), variable.to_string()), idx);
        self.by_group.entry(group.to_string()).or_default().push(idx);
        self.by_variable.entry(variable.to_string()).or_default().push(idx);
    }

    /// Create on first call, else requires matching tag/shape-head, into
    /// a single full-length buffer.
    pub fn put_db<T: Primitive>(&mut self, group: &str, variable: &str, data: Vec<T>) -> Result<()> {
        let len = data.len();
        let cell = T::wrap(data);
        if self.has(group, variable) {
            let entry = self.entry_mut(group, variable)?;
            entry.variable.overwrite(vec![len], cell)
        } else {
            let locations_dimensioned = len == self.nlocs;
            let mut var = Variable::new(variable, T::TAG, vec![len], Mode::ReadWrite, locations_dimensioned, None);
            var.overwrite(vec![len], cell)?;
            self.insert_new(group, variable, var);
            Ok(())
        }
    }

    /// Read the full buffer, failing with `LengthMismatch` if it doesn't
    /// hold exactly `expected_length` values.
    pub fn get_db<T: Primitive>(&self, group: &str, variable: &str, expected_length: usize) -> Result<Vec<T>> {
        let entry = self.entry(group, variable)?;
        let values = T::unwrap(entry.variable.cell())?;
        if values.len() != expected_length {
            return crate::err_at!(
                LengthMismatch,
                msg: "({:?}, {:?}) holds {} values, {} requested",
                group,
                variable,
                values.len(),
                expected_length
            );
        }
        Ok(values.to_vec())
    }

    /// Shaped store with optional append. On append, `shape[0]` is the
    /// number of new leading-axis rows; on overwrite, `shape` is the full
    /// new shape.
    pub fn store_to_db<T: Primitive>(
        &mut self,
        group: &str,
        variable: &str,
        shape: Shape,
        data: Vec<T>,
        append: bool,
    ) -> Result<()> {
        let cell = T::wrap(data);
        if self.has(group, variable) {
            let entry = self.entry_mut(group, variable)?;
            if append {
                let extra = *shape.first().unwrap_or(&0);
                entry.variable.append_leading(extra, cell)
            } else {
                entry.variable.overwrite(shape, cell)
            }
        } else {
            let locations_dimensioned = shape.first() == Some(&self.nlocs);
            let mut var = Variable::new(variable, T::TAG, shape.clone(), Mode::ReadWrite, locations_dimensioned, None);
            var.overwrite(shape, cell)?;
            self.insert_new(group, variable, var);
            Ok(())
        }
    }

    /// Partial read along the leading axis. `count = None` means "to the
    /// end".
    pub fn load_from_db<T: Primitive>(
        &self,
        group: &str,
        variable: &str,
        start: usize,
        count: Option<usize>,
    ) -> Result<Vec<T>> {
        let entry = self.entry(group, variable)?;
        let shape = entry.variable.shape();
        let leading = *shape.first().unwrap_or(&0);
        let count = count.unwrap_or(leading.saturating_sub(start));

        let mut selection = full_selection(shape);
        if let Some(first) = selection.first_mut() {
            *first = (start, count);
        }
        let cell = entry.variable.read_range(&selection)?;
        Ok(T::unwrap(&cell)?.to_vec())
    }

    /// Insert a fully-formed variable as read-only, used by ingest after
    /// projecting a backend column onto owned indices.
    pub fn insert_read_only<T: Primitive>(
        &mut self,
        group: &str,
        variable: &str,
        shape: Shape,
        data: Vec<T>,
        locations_dimensioned: bool,
    ) -> Result<()> {
        if self.has(group, variable) {
            return Err(Error::AlreadyExists(format!("({:?}, {:?}) already loaded", group, variable)));
        }
        let mut var = Variable::new(variable, T::TAG, shape.clone(), Mode::ReadOnly, locations_dimensioned, None);
        var.overwrite(shape, T::wrap(data))?;
        self.insert_new(group, variable, var);
        Ok(())
    }

    pub fn iter_by_insertion(&self) -> impl Iterator<Item = VariableView<'_>> {
        self.entries.iter().map(|e| VariableView {
            group: &e.group,
            variable: e.variable.name(),
            shape: e.variable.shape(),
            tag: e.variable.tag(),
        })
    }

    pub fn iter_by_group(&self) -> impl Iterator<Item = VariableView<'_>> {
        self.by_group.iter().flat_map(move |(_, idxs)| {
            idxs.iter().map(move |&i| {
                let e = &self.entries[i];
                VariableView { group: &e.group, variable: e.variable.name(), shape: e.variable.shape(), tag: e.variable.tag() }
            })
        })
    }

    pub fn iter_by_variable(&self) -> impl Iterator<Item = VariableView<'_>> {
        self.by_variable.iter().flat_map(move |(_, idxs)| {
            idxs.iter().map(move |&i| {
                let e = &self.entries[i];
                VariableView { group: &e.group, variable: e.variable.name(), shape: e.variable.shape(), tag: e.variable.tag() }
            })
        })
    }

    /// Persist the whole container via `format`'s backend. Never mutates
    /// `self`: on `BackendIOError` the backend is simply dropped, leaving
    /// whatever partial file it had written on disk, while in-memory
    /// state stays untouched.
    pub fn save(&self, path: &Path, format: &str, hdf5_opts: Hdf5Options) -> Result<()> {
        let mut backend = create_backend(format, path, CreateMode::Truncate, hdf5_opts)?;
        for entry in &self.entries {
            let group = backend.root_mut().open_or_create(&entry.group)?;
            let stored = group.variables_mut().create(
                entry.variable.name(),
                entry.variable.tag(),
                entry.variable.shape().to_vec(),
                entry.variable.mode(),
                entry.variable.is_locations_dimensioned(),
                entry.variable.chunking().map(|c| c.to_vec()),
            )?;
            let selection = full_selection(entry.variable.shape());
            let data = entry.variable.read_range(&selection)?;
            stored.write_range(&selection, &data)?;
        }
        backend.close()
    }

    /// On-disk name this entry would be written/read as, per the legacy
    /// `variable@group` convention.
    pub fn on_disk_name(group: &str, variable: &str) -> String {
        join_at_group(variable, group)
    }

    pub fn split_on_disk_name(name: &str) -> (&str, &str) {
        let (v, g) = split_at_group(name);
        (v, g)
    }

    /// Destroy a single `(group, variable)` entry ahead of whole-space
    /// teardown. Removes it from all three indices and reindexes every
    /// arena index past the removed one down by one, the same
    /// reshuffle-in-place pattern `AttributeStore::remove` and
    /// `VariableStore::remove` use, so survivor order in every iterator
    /// view is unaffected.
    pub fn remove(&mut self, group: &str, variable: &str) -> Result<Variable> {
        let key = (group.to_string(), variable.to_string());
        let idx = self
            .primary
            .remove(&key)
            .ok_or_else(|| Error::NotFound(format!("({:?}, {:?}) not found", group, variable)))?;

        if let Some(idxs) = self.by_group.get_mut(group) {
            idxs.retain(|&i| i != idx);
            if idxs.is_empty() {
                self.by_group.remove(group);
            }
        }
        if let Some(idxs) = self.by_variable.get_mut(variable) {
            idxs.retain(|&i| i != idx);
            if idxs.is_empty() {
                self.by_variable.remove(variable);
            }
        }

        let removed = self.entries.remove(idx);

        for v in self.primary.values_mut() {
            if *v > idx {
                *v -= 1;
            }
        }
        for idxs in self.by_group.values_mut() {
            for v in idxs.iter_mut() {
                if *v > idx {
                    *v -= 1;
                }
            }
        }
        for idxs in self.by_variable.values_mut() {
            for v in idxs.iter_mut() {
                if *v > idx {
                    *v -= 1;
                }
            }
        }

        Ok(removed.variable)
    }
}

#[cfg(test)]
#[path = "obsspace_test.rs"]
mod obsspace_test;
