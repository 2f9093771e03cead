//! # Geodata
//!
//! Country outlines from a TopoJSON or GeoJSON file, turned into border
//! loops on the globe, floating labels and the centroid table used by search.
//!
//! ## Sub-modules
//! - `topology`: TopoJSON decoding into a GeoJSON feature collection
//! - `loader`: reading the file and extracting named country outlines
//! - `builder`: projecting outlines into border loops, labels and centroids
//! - `renderer`: spawning the meshes and label entities
//! - `borders_plugin`: loading off the main thread and handing over to the viewer

mod borders_plugin;
mod builder;
mod loader;
mod renderer;
mod topology;

pub use borders_plugin::*;
pub use builder::*;
pub use loader::*;
pub use renderer::*;
pub use topology::*;
