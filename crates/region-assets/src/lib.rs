//! Region asset store.
//!
//! Each region is a directory holding a mandatory `boundary.geojson` and any
//! number of auxiliary `<layer>.geojson` files:
//!
//! ```text
//! <root>/
//!   taiyuangeo/
//!     boundary.geojson
//!     roads.geojson
//!     water.geojson
//! ```
//!
//! Assets are read-only; a store can be shared across threads freely.

pub mod boundary;
pub mod geojson;
pub mod layer;
pub mod store;

pub use boundary::BoundaryPolygon;
pub use layer::VectorLayer;
pub use store::{RegionAssetStore, BOUNDARY_FILE};
