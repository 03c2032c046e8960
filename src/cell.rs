//! Tagged container for one typed, shaped array.
//!
//! Rather than a single erased value with runtime downcasts, [`Cell`] is a
//! closed tagged union over the four primitive types the store ever holds.
//! This keeps dispatch a single match rather than a chain of `Any`
//! downcasts, at the cost of knowing the full set of primitives up front.

use crate::err_at;
use crate::types::{DateTime, Tag};
use crate::{Error, Result};

/// One typed, contiguous buffer. `Cell::I32`/`F32` hold POD data and are
/// bulk-copied with `clone_from_slice`; `Cell::Str` is copied element-wise
/// since `String` is not POD.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    I32(Vec<i32>),
    F32(Vec<f32>),
    Str(Vec<String>),
    DateTime(Vec<DateTime>),
}

impl Cell {
    pub fn new(tag: Tag, len: usize) -> Cell {
        match tag {
            Tag::I32 => Cell::I32(vec![0; len]),
            Tag::F32 => Cell::F32(vec![0.0; len]),
            Tag::Str => Cell::Str(vec![String::new(); len]),
            Tag::DateTime => Cell::DateTime(vec![DateTime::default(); len]),
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Cell::I32(_) => Tag::I32,
            Cell::F32(_) => Tag::F32,
            Cell::Str(_) => Tag::Str,
            Cell::DateTime(_) => Tag::DateTime,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Cell::I32(v) => v.len(),
            Cell::F32(v) => v.len(),
            Cell::Str(v) => v.len(),
            Cell::DateTime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mismatch(&self, want: Tag) -> Error {
        Error::TypeMismatch(format!(
            "cell holds {} values, {} requested",
            self.tag(),
            want
        ))
    }

    /// Write `data` starting at `offset`, failing with `TypeMismatch` if
    /// `data`'s tag disagrees with this cell's tag, and `OutOfRange` if it
    /// would run past the end of the buffer.
    pub fn write_range(&mut self, offset: usize, data: &Cell) -> Result<()> {
        macro_rules! splice {
            ($dst:expr, $src:expr) => {{
                if offset + $src.len() > $dst.len() {
                    return err_at!(
                        OutOfRange,
                        msg: "write [{}, {}) exceeds cell length {}",
                        offset,
                        offset + $src.len(),
                        $dst.len()
                    );
                }
                $dst[offset..offset + $src.len()].clone_from_slice($src);
                Ok(())
            }};
        }

        match (self, data) {
            (Cell::I32(dst), Cell::I32(src)) => splice!(dst, src),
            (Cell::F32(dst), Cell::F32(src)) => splice!(dst, src),
            (Cell::Str(dst), Cell::Str(src)) => splice!(dst, src),
            (Cell::DateTime(dst), Cell::DateTime(src)) => splice!(dst, src),
            (dst, _) => Err(dst.mismatch(data.tag())),
        }
    }

    /// Read `count` values starting at `start`, returned as a freshly
    /// allocated `Cell` of the same tag.
    pub fn read_range(&self, start: usize, count: usize) -> Result<Cell> {
        macro_rules! slice {
            ($v:expr, $wrap:expr) => {{
                if start + count > $v.len() {
                    return err_at!(
                        OutOfRange,
                        msg: "read [{}, {}) exceeds cell length {}",
                        start,
                        start + count,
                        $v.len()
                    );
                }
                Ok($wrap($v[start..start + count].to_vec()))
            }};
        }

        match self {
            Cell::I32(v) => slice!(v, Cell::I32),
            Cell::F32(v) => slice!(v, Cell::F32),
            Cell::Str(v) => slice!(v, Cell::Str),
            Cell::DateTime(v) => slice!(v, Cell::DateTime),
        }
    }

    /// Append `other`'s values to the end of this cell, failing with
    /// `TypeMismatch` on a tag disagreement (used by append-mode stores).
    pub fn append(&mut self, other: Cell) -> Result<()> {
        match (self, other) {
            (Cell::I32(dst), Cell::I32(mut src)) => Ok(dst.append(&mut src)),
            (Cell::F32(dst), Cell::F32(mut src)) => Ok(dst.append(&mut src)),
            (Cell::Str(dst), Cell::Str(mut src)) => Ok(dst.append(&mut src)),
            (Cell::DateTime(dst), Cell::DateTime(mut src)) => Ok(dst.append(&mut src)),
            (dst, other) => Err(dst.mismatch(other.tag())),
        }
    }

    /// Project this cell onto the given (ascending) global indices along
    /// its leading axis, keeping only those rows. `row_stride` is the
    /// product of every trailing extent (1 for a plain rank-1 column; the
    /// channel count for a `[nlocs, nvars]` radiance-style variable), so
    /// each selected index pulls a contiguous block of `row_stride`
    /// elements rather than a single flat value. Used to restrict a
    /// freshly read, locations-dimensioned column to a rank's owned
    /// indices.
    pub fn project(&self, indices: &[usize], row_stride: usize) -> Cell {
        macro_rules! take {
            ($v:expr, $wrap:expr) => {
                $wrap(
                    indices
                        .iter()
                        .flat_map(|&i| $v[i * row_stride..(i + 1) * row_stride].iter().cloned())
                        .collect(),
                )
            };
        }
        match self {
            Cell::I32(v) => take!(v, Cell::I32),
            Cell::F32(v) => take!(v, Cell::F32),
            Cell::Str(v) => take!(v, Cell::Str),
            Cell::DateTime(v) => take!(v, Cell::DateTime),
        }
    }

    /// Scatter-write: `offsets[i]` receives the `i`-th value of `data`.
    /// Used to implement multi-dimensional hyperslab writes on top of a
    /// flat row-major buffer (see `variable::hyperslab_offsets`).
    pub fn scatter_write(&mut self, offsets: &[usize], data: &Cell) -> Result<()> {
        if offsets.len() != data.len() {
            return err_at!(
                LengthMismatch,
                msg: "selection has {} cells, {} values supplied",
                offsets.len(),
                data.len()
            );
        }
        macro_rules! scatter {
            ($dst:expr, $src:expr) => {{
                for (&off, v) in offsets.iter().zip($src.iter()) {
                    if off >= $dst.len() {
                        return err_at!(OutOfRange, msg: "offset {} exceeds cell length {}", off, $dst.len());
                    }
                    $dst[off] = v.clone();
                }
                Ok(())
            }};
        }
        match (self, data) {
            (Cell::I32(dst), Cell::I32(src)) => scatter!(dst, src),
            (Cell::F32(dst), Cell::F32(src)) => scatter!(dst, src),
            (Cell::Str(dst), Cell::Str(src)) => scatter!(dst, src),
            (Cell::DateTime(dst), Cell::DateTime(src)) => scatter!(dst, src),
            (dst, _) => Err(dst.mismatch(data.tag())),
        }
    }

    /// Gather-read: build a new cell from `self[offsets[i]]` for each `i`.
    pub fn gather_read(&self, offsets: &[usize]) -> Result<Cell> {
        macro_rules! gather {
            ($v:expr, $wrap:expr) => {{
                let mut out = Vec::with_capacity(offsets.len());
                for &off in offsets {
                    if off >= $v.len() {
                        return err_at!(OutOfRange, msg: "offset {} exceeds cell length {}", off, $v.len());
                    }
                    out.push($v[off].clone());
                }
                Ok($wrap(out))
            }};
        }
        match self {
            Cell::I32(v) => gather!(v, Cell::I32),
            Cell::F32(v) => gather!(v, Cell::F32),
            Cell::Str(v) => gather!(v, Cell::Str),
            Cell::DateTime(v) => gather!(v, Cell::DateTime),
        }
    }

    pub fn as_i32(&self) -> Result<&[i32]> {
        match self {
            Cell::I32(v) => Ok(v),
            _ => Err(self.mismatch(Tag::I32)),
        }
    }

    pub fn as_f32(&self) -> Result<&[f32]> {
        match self {
            Cell::F32(v) => Ok(v),
            _ => Err(self.mismatch(Tag::F32)),
        }
    }

    pub fn as_f32_mut(&mut self) -> Result<&mut [f32]> {
        let tag = self.tag();
        match self {
            Cell::F32(v) => Ok(v),
            _ => Err(Error::TypeMismatch(format!("cell holds {} values, f32 requested", tag))),
        }
    }

    pub fn as_str(&self) -> Result<&[String]> {
        match self {
            Cell::Str(v) => Ok(v),
            _ => Err(self.mismatch(Tag::Str)),
        }
    }

    pub fn as_date_time(&self) -> Result<&[DateTime]> {
        match self {
            Cell::DateTime(v) => Ok(v),
            _ => Err(self.mismatch(Tag::DateTime)),
        }
    }
}

/// Bridges a native Rust type to its [`Tag`] and [`Cell`] variant, so that
/// generic store operations (`put_db<T>`/`get_db<T>`) can be written once
/// against `T: Primitive` instead of once per primitive (mirrors the
/// `impl_diff_basic_types!`/`impl_footprint_basic_types!` macro idiom used
/// elsewhere in this codebase for the same per-primitive boilerplate).
pub trait Primitive: Clone + Sized + 'static {
    const TAG: Tag;

    fn wrap(values: Vec<Self>) -> Cell;
    fn unwrap(cell: &Cell) -> Result<&[Self]>;
}

macro_rules! impl_primitive {
    ($t:ty, $tag:expr, $variant:ident) => {
        impl Primitive for $t {
            const TAG: Tag = $tag;

            fn wrap(values: Vec<Self>) -> Cell {
                Cell::$variant(values)
            }

            fn unwrap(cell: &Cell) -> Result<&[Self]> {
                match cell {
                    Cell::$variant(v) => Ok(v),
                    _ => Err(Error::TypeMismatch(format!(
                        "cell holds {} values, {} requested",
                        cell.tag(),
                        $tag
                    ))),
                }
            }
        }
    };
}

impl_primitive!(i32, Tag::I32, I32);
impl_primitive!(f32, Tag::F32, F32);
impl_primitive!(String, Tag::Str, Str);
impl_primitive!(DateTime, Tag::DateTime, DateTime);

#[cfg(test)]
#[path = "cell_test.rs"]
mod cell_test;
