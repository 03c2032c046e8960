//! Pure in-memory backend: no file at all. This is the backend the
//! ObsSpace uses internally as its primary working store; it never
//! blocks and has nothing to flush on close.

use super::{Backend, Capabilities};
use crate::group::Group;
use crate::Result;

#[derive(Debug)]
pub struct MemBackend {
    root: Group,
}

impl MemBackend {
    pub fn new() -> Self {
        MemBackend { root: Group::root() }
    }
}

impl Default for MemBackend {
    fn default() -> Self {
        MemBackend::new()
    }
}

impl Backend for MemBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            partial_io: true,
            attribute_rename: true,
            grouping: true,
            concurrent_readers: true,
        }
    }

    fn root(&self) -> &Group {
        &self.root
    }

    fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "mem_test.rs"]
mod mem_test;
