//! Everything between the CPU-side scene description and the scene shader.
//!
//! - `uniforms` defines the uniform names and the [`uniforms::UniformBridge`] trait
//! - `scene` mirrors the shader's uniform block on the CPU
//! - `light` writes light setups through the bridge
//! - `basic` builds the render pipeline and uploads per-draw uniforms

pub mod basic;
pub mod light;
pub mod scene;
pub mod uniforms;
