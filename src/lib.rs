//! flow-shade
//!
//! The resource and uniform layer of a small immediate-mode renderer built on
//! wgpu. Textures and materials are addressed by caller-chosen tags, lights are
//! described declaratively, and everything ends up as named uniform writes
//! against one scene shader before each draw call.
//!
//! High-level modules
//! - `context`: headless GPU context that owns device/queue, offscreen targets
//!   and the scene pipeline
//! - `data_structures`: transforms, materials, lights, textures and vertices
//! - `error`: typed errors of the texture, lighting and draw layers
//! - `pipelines`: the uniform bridge, the CPU mirror of the shader state, the
//!   light configurator and the render pipeline
//! - `resources`: the tag-addressed texture registry and asset file helpers
//! - `render`: per-draw state composition and frame recording
//!

pub mod context;
pub mod data_structures;
pub mod error;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use error::{DrawError, LightingError, TextureError};

/// Initialize `env_logger` once. Calling it again is harmless.
pub fn init_logger() {
    if let Err(e) = env_logger::try_init() {
        log::debug!("Logger already initialized: {}", e);
    }
}
