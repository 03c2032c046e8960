//! Hierarchical namespace of variables and attributes.

use std::collections::BTreeMap;

use crate::attr::AttributeStore;
use crate::variable::VariableStore;
use crate::{Error, Result};

/// Split a relative path on `/`, rejecting empty segments and `.`/`..`.
/// Forward slash is the only separator; empty names and `.`/`..` are
/// rejected.
fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Ok(vec![]);
    }
    let segments: Vec<&str> = path.split('/').collect();
    for seg in &segments {
        if seg.is_empty() || *seg == "." || *seg == ".." {
            return Err(Error::InvalidConfig(format!(
                "invalid group path segment {:?} in {:?}",
                seg, path
            )));
        }
    }
    Ok(segments)
}

/// A node in the group tree. Owns its children, its variables and its
/// attributes.
#[derive(Clone, Debug, Default)]
pub struct Group {
    name: String,
    children: BTreeMap<String, Group>,
    variables: VariableStore,
    attributes: AttributeStore,
}

impl Group {
    /// Construct the tree root, named `/`.
    pub fn root() -> Group {
        Group { name: "/".to_string(), ..Group::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableStore {
        &mut self.variables
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    /// Names of immediate child groups, sorted.
    pub fn list(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    /// Open an existing descendant group by relative path, e.g.
    /// `"MetaData"` or `"a/b"`. An empty path returns `self`.
    pub fn open(&self, path: &str) -> Result<&Group> {
        let segments = split_path(path)?;
        let mut node = self;
        for seg in segments {
            node = node
                .children
                .get(seg)
                .ok_or_else(|| Error::NotFound(format!("group {:?} not found", path)))?;
        }
        Ok(node)
    }

    pub fn open_mut(&mut self, path: &str) -> Result<&mut Group> {
        let segments = split_path(path)?;
        let mut node = self;
        for seg in segments {
            node = node
                .children
                .get_mut(seg)
                .ok_or_else(|| Error::NotFound(format!("group {:?} not found", path)))?;
        }
        Ok(node)
    }

    /// Create a descendant group, creating intermediate groups as needed
    /// (mkdir -p semantics) but failing with `AlreadyExists` if the leaf
    /// itself is already present.
    pub fn create(&mut self, path: &str) -> Result<&mut Group> {
        let segments = split_path(path)?;
        if segments.is_empty() {
            return Err(Error::AlreadyExists("root group always exists".to_string()));
        }
        let mut node = self;
        let (leaf, parents) = segments.split_last().unwrap();
        for seg in parents {
            node = node
                .children
                .entry(seg.to_string())
                .or_insert_with(|| Group { name: seg.to_string(), ..Group::default() });
        }
        if node.children.contains_key(*leaf) {
            return Err(Error::AlreadyExists(format!("group {:?} already exists", path)));
        }
        node.children.insert(leaf.to_string(), Group { name: leaf.to_string(), ..Group::default() });
        Ok(node.children.get_mut(*leaf).unwrap())
    }

    /// Open a descendant group, creating it (and any intermediate groups)
    /// if absent. Used by the ObsSpace when materializing `group@variable`
    /// entries whose group may not yet exist.
    pub fn open_or_create(&mut self, path: &str) -> Result<&mut Group> {
        let segments = split_path(path)?;
        let mut node = self;
        for seg in segments {
            node = node
                .children
                .entry(seg.to_string())
                .or_insert_with(|| Group { name: seg.to_string(), ..Group::default() });
        }
        Ok(node)
    }
}

#[cfg(test)]
#[path = "group_test.rs"]
mod group_test;
