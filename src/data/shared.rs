//! SharedMeshStore: the mutual-exclusion boundary for concurrent producers.
//!
//! The engine itself is single-threaded; mesh generators that populate
//! disjoint id regions from several workers must serialize their insertions
//! through this wrapper. Downward builds and compaction are stop-the-world:
//! recover the exclusive store with [`SharedMeshStore::try_into_inner`] once
//! all producers are done.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::data::cell_store::MeshStore;
use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::ids::{CellId, NodeId};

/// Cloneable handle serializing insertions into one [`MeshStore`].
#[derive(Clone, Debug, Default)]
pub struct SharedMeshStore {
    inner: Arc<Mutex<MeshStore>>,
}

impl SharedMeshStore {
    pub fn new(store: MeshStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn add_node(&self, xyz: [f64; 3]) -> NodeId {
        self.inner.lock().add_node(xyz)
    }

    pub fn add_node_at(&self, id: NodeId, xyz: [f64; 3]) -> Result<NodeId, MeshError> {
        self.inner.lock().add_node_at(id, xyz)
    }

    pub fn add_cell(&self, ty: CellType, nodes: &[NodeId]) -> Result<CellId, MeshError> {
        self.inner.lock().add_cell(ty, nodes)
    }

    pub fn add_cell_at(
        &self,
        id: CellId,
        ty: CellType,
        nodes: &[NodeId],
    ) -> Result<CellId, MeshError> {
        self.inner.lock().add_cell_at(id, ty, nodes)
    }

    /// Run a closure under the lock, for multi-call insertions that must be
    /// atomic with respect to other producers.
    pub fn with<R>(&self, f: impl FnOnce(&mut MeshStore) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Recover the exclusive store once all producer handles are dropped.
    pub fn try_into_inner(self) -> Result<MeshStore, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
