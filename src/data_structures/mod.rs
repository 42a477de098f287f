//! Engine data structures: handles, bounds, colours, transforms, scene graphs and textures.
//!
//! This module contains the core data types for scene representation:
//!
//! - `arena` holds generational storage and the typed [`arena::Handle`]
//! - `aabb` is the axis-aligned bounding box used by geometries and ray queries
//! - `color` is the RGBA colour used for materials and backgrounds
//! - `transform` holds per-node position, rotation and scale
//! - `scene_graph` enables hierarchical scene organization
//! - `texture` contains the CPU colour/depth and id textures render targets draw into

pub mod aabb;
pub mod arena;
pub mod color;
pub mod scene_graph;
pub mod texture;
pub mod transform;
