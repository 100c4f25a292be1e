//! `NodeId` / `CellId`: strong, zero-cost handles for mesh entities
//!
//! Both wrap a `u32` array index into the dense store. Ids are stable until
//! the next compaction; holes left by removal keep their id until then.
//! `repr(transparent)` guarantees the same layout as the raw integer, so the
//! handles can cross FFI or be memcpy'd in bulk.

use std::fmt;

/// Dense index of a point (node) in the store.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct NodeId(u32);

/// Dense index of a cell in the store.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct CellId(u32);

impl NodeId {
    /// Creates a `NodeId` from a raw dense index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        NodeId(raw)
    }

    /// Returns the raw index value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the index as `usize` for array access.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl CellId {
    /// Creates a `CellId` from a raw dense index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        CellId(raw)
    }

    /// Returns the raw index value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the index as `usize` for array access.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeId").field(&self.0).finish()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CellId").field(&self.0).finish()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
