//! Planar geometry helpers shared by extraction and merging.

pub mod projection;
pub mod repair;

pub use projection::Reprojector;
pub use repair::{dominant_part, make_valid, positive_parts, repair_polygon, repair_ring};
