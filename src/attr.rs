//! Small named metadata attached to groups and variables.
//!
//! Attributes are always fully resident: no partial I/O, no append mode.
//! So the store backing them is a plain insertion-ordered vector plus a
//! name index, the simplest member of the "one owning vector plus index"
//! family used throughout this crate.

use std::collections::HashMap;

use crate::cell::Cell;
use crate::types::{Shape, Tag};
use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    name: String,
    shape: Shape,
    cell: Cell,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn tag(&self) -> Tag {
        self.cell.tag()
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut Cell {
        &mut self.cell
    }
}

/// An insertion-ordered collection of [`Attribute`] values, the concrete
/// backing for any type implementing `Has_Attributes`.
#[derive(Clone, Debug, Default)]
pub struct AttributeStore {
    attrs: Vec<Attribute>,
    by_name: HashMap<String, usize>,
}

impl AttributeStore {
    pub fn new() -> Self {
        AttributeStore::default()
    }

    pub fn create(&mut self, name: &str, tag: Tag, shape: Shape) -> Result<&mut Attribute> {
        if self.by_name.contains_key(name) {
            return Err(Error::AlreadyExists(format!("attribute {:?} already exists", name)));
        }
        let len = crate::types::shape_len(&shape);
        let attr = Attribute { name: name.to_string(), shape, cell: Cell::new(tag, len) };
        let idx = self.attrs.len();
        self.attrs.push(attr);
        self.by_name.insert(name.to_string(), idx);
        Ok(&mut self.attrs[idx])
    }

    pub fn open(&self, name: &str) -> Result<&Attribute> {
        let idx = *self
            .by_name
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("attribute {:?} not found", name)))?;
        Ok(&self.attrs[idx])
    }

    pub fn open_mut(&mut self, name: &str) -> Result<&mut Attribute> {
        let idx = *self
            .by_name
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("attribute {:?} not found", name)))?;
        Ok(&mut self.attrs[idx])
    }

    pub fn exists(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Remove an attribute. Indices of later-inserted attributes are
    /// relocated but iteration order among survivors is unaffected
    /// (matches the reshuffle-in-place pattern used for arena-style
    /// stores elsewhere in this crate).
    pub fn remove(&mut self, name: &str) -> Result<Attribute> {
        let idx = self
            .by_name
            .remove(name)
            .ok_or_else(|| Error::NotFound(format!("attribute {:?} not found", name)))?;
        let removed = self.attrs.remove(idx);
        for v in self.by_name.values_mut() {
            if *v > idx {
                *v -= 1;
            }
        }
        Ok(removed)
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if !self.by_name.contains_key(old) {
            return Err(Error::NotFound(format!("attribute {:?} not found", old)));
        }
        if self.by_name.contains_key(new) {
            return Err(Error::AlreadyExists(format!("attribute {:?} already exists", new)));
        }
        let idx = self.by_name.remove(old).unwrap();
        self.attrs[idx].name = new.to_string();
        self.by_name.insert(new.to_string(), idx);
        Ok(())
    }

    /// Attribute names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.attrs.iter().map(|a| a.name.clone()).collect();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }
}

#[cfg(test)]
#[path = "attr_test.rs"]
mod attr_test;
