//! Per-draw state composition and frame recording.
//!
//! [`DrawState`] is the render context threaded through a scene script: it
//! turns tags, transforms and colors into uniform writes. [`Frame`] records
//! what the shader state looked like at every draw call so the whole frame can
//! be replayed into one wgpu render pass later.
//!
//! # Key types
//!
//! - [`DrawState`] sets transform, color, texture, UV scale and material
//! - [`Mesh`] is implemented by externally generated geometry
//! - [`BufferMesh`] is a ready-made indexed mesh of [`ShapeVertex`]
//! - [`Frame`] holds one uniform snapshot per draw
//!

use cgmath::{Matrix4, Vector2, Vector3, Vector4};
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{material::MaterialTable, transform::Transform, vertex::ShapeVertex},
    error::DrawError,
    pipelines::{
        scene::{ShaderState, ShaderUniforms},
        uniforms::{SLOT_SENTINEL, UniformBridge, names},
    },
    resources::texture::{RegistryState, TextureBackend, TextureRegistry},
};

/// Geometry that can draw itself into a render pass.
///
/// Pipeline and bind groups are already set when `draw` is called; the mesh
/// only binds its buffers and issues the draw.
pub trait Mesh {
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// Indexed triangle list of [`ShapeVertex`].
pub struct BufferMesh {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub amount: u32,
}

impl BufferMesh {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        vertices: &[ShapeVertex],
        indices: &[u16],
    ) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        // index buffers must be a multiple of 4 bytes long
        let mut padded = indices.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&padded),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            amount: indices.len() as u32,
        }
    }
}

impl Mesh for BufferMesh {
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.amount, 0, 0..1);
    }
}

/// Explicit render context for one scene: the uniform bridge plus the
/// texture and material lookups every per-object call needs.
///
/// Uniform values persist between calls, so every draw should set everything
/// it depends on.
pub struct DrawState<'a, U: UniformBridge, B: TextureBackend> {
    bridge: &'a mut U,
    textures: &'a TextureRegistry<B>,
    materials: &'a MaterialTable,
}

impl<'a, U: UniformBridge, B: TextureBackend> DrawState<'a, U, B> {
    pub fn new(
        bridge: &'a mut U,
        textures: &'a TextureRegistry<B>,
        materials: &'a MaterialTable,
    ) -> Self {
        Self {
            bridge,
            textures,
            materials,
        }
    }

    pub fn bridge(&self) -> &U {
        &*self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut U {
        &mut *self.bridge
    }

    /// Write the view and projection matrices and the eye position.
    pub fn set_camera(
        &mut self,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        position: impl Into<Vector3<f32>>,
    ) {
        self.bridge.set_mat4(names::VIEW, view);
        self.bridge.set_mat4(names::PROJECTION, projection);
        self.bridge.set_vec3(names::VIEW_POSITION, position.into());
    }

    /// Compose `transform` and write it as the model matrix.
    pub fn set_transformations(&mut self, transform: &Transform) {
        self.bridge.set_mat4(names::MODEL, transform.to_matrix());
    }

    /// Draw with a flat RGBA color instead of a texture.
    pub fn set_shader_color(&mut self, color: impl Into<Vector4<f32>>) {
        self.bridge.set_bool(names::USE_TEXTURE, false);
        self.bridge.set_vec4(names::OBJECT_COLOR, color.into());
    }

    /// Draw with the texture registered under `tag`.
    ///
    /// Returns the slot now sampled. An unknown tag still enables texturing
    /// but points the sampler at slot -1, which the shader renders with the
    /// flat color.
    pub fn set_shader_texture(&mut self, tag: &str) -> Result<usize, DrawError> {
        if self.textures.state() != RegistryState::Bound {
            return Err(DrawError::TexturesNotBound);
        }

        self.bridge.set_bool(names::USE_TEXTURE, true);
        match self.textures.resolve_slot(tag) {
            Some(slot) => {
                self.bridge.set_sampler2d(names::OBJECT_TEXTURE, slot as i32);
                Ok(slot)
            }
            None => {
                log::warn!("Texture {:?} is not loaded, falling back to the object color", tag);
                self.bridge.set_sampler2d(names::OBJECT_TEXTURE, SLOT_SENTINEL);
                Err(DrawError::UnknownTexture(tag.to_string()))
            }
        }
    }

    pub fn set_texture_uv_scale(&mut self, u: f32, v: f32) {
        self.bridge.set_vec2(names::UV_SCALE, Vector2::new(u, v));
    }

    /// Write every field of the material tagged `tag`. A miss writes nothing.
    pub fn set_shader_material(&mut self, tag: &str) -> Result<(), DrawError> {
        let material = self
            .materials
            .find(tag)
            .ok_or_else(|| DrawError::UnknownMaterial(tag.to_string()))?;

        self.bridge.set_vec3(names::material::AMBIENT_COLOR, material.ambient_color);
        self.bridge.set_float(names::material::AMBIENT_STRENGTH, material.ambient_strength);
        self.bridge.set_vec3(names::material::DIFFUSE_COLOR, material.diffuse_color);
        self.bridge.set_vec3(names::material::SPECULAR_COLOR, material.specular_color);
        self.bridge.set_float(names::material::SHININESS, material.shininess);
        Ok(())
    }
}

/// One recorded draw call.
pub struct Draw<'m> {
    pub uniforms: ShaderUniforms,
    pub mesh: &'m dyn Mesh,
}

/// The draw calls of one frame, in submission order.
#[derive(Default)]
pub struct Frame<'m> {
    draws: Vec<Draw<'m>>,
}

impl<'m> Frame<'m> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `mesh` with a copy of the current shader state.
    pub fn draw(&mut self, state: &ShaderState, mesh: &'m dyn Mesh) {
        self.draws.push(Draw {
            uniforms: *state.uniforms(),
            mesh,
        });
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn draws(&self) -> impl Iterator<Item = &Draw<'m>> {
        self.draws.iter()
    }

    pub fn snapshots(&self) -> impl ExactSizeIterator<Item = &ShaderUniforms> {
        self.draws.iter().map(|draw| &draw.uniforms)
    }
}
