//! Engine data structures: transforms, materials, lights, textures and vertices.
//!
//! - `transform` composes scale/rotation/translation into a model matrix
//! - `material` contains tagged material parameters and their lookup table
//! - `light` contains point light descriptors and the scene lighting setup
//! - `texture` contains the decoded image type and the GPU texture wrapper
//! - `vertex` holds the vertex layout meshes must provide

pub mod light;
pub mod material;
pub mod texture;
pub mod transform;
pub mod vertex;
