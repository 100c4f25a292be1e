//! Algorithms layered on the store and the downward structure.

pub mod extrude;

pub use extrude::{extrude_volume_from_face, NodeDomains, QuadMids};
