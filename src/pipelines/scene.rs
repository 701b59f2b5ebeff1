//! CPU mirror of the scene shader's uniform block.
//!
//! [`ShaderState`] is the program-side [`UniformBridge`]: every named write
//! lands in a `bytemuck::Pod` struct laid out exactly like `Uniforms` in
//! `scene.wgsl`, so a draw only has to copy it into the uniform buffer.

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector2, Vector3, Vector4};

use crate::{
    data_structures::light::MAX_LIGHTS,
    pipelines::uniforms::{UniformBridge, names, parse_light_field},
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub ambient_color: [f32; 3],
    pub ambient_strength: f32,
    pub diffuse_color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    pub specular_color: [f32; 3],
    pub shininess: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub focal_strength: f32,
    pub diffuse_color: [f32; 3],
    pub specular_intensity: f32,
    pub specular_color: [f32; 3],
    _padding: u32,
}

/// Everything the scene shader reads for one draw call.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Inverse transpose of the upper 3x3 of `model`, columns padded to vec4.
    pub normal_matrix: [[f32; 4]; 3],
    pub object_color: [f32; 4],
    pub view_position: [f32; 3],
    pub use_texture: i32,
    pub global_ambient_color: [f32; 3],
    pub use_lighting: i32,
    pub uv_scale: [f32; 2],
    pub object_texture: i32,
    _padding: i32,
    pub material: MaterialUniform,
    pub light_sources: [LightUniform; MAX_LIGHTS],
}

/// Size of the WGSL `Uniforms` struct.
pub const SHADER_UNIFORMS_SIZE: usize = 544;
const _: () = assert!(std::mem::size_of::<ShaderUniforms>() == SHADER_UNIFORMS_SIZE);

impl Default for ShaderUniforms {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        Self {
            model: identity,
            view: identity,
            projection: identity,
            normal_matrix: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
            object_color: [1.0, 1.0, 1.0, 1.0],
            view_position: [0.0; 3],
            use_texture: 0,
            global_ambient_color: [0.0; 3],
            use_lighting: 0,
            uv_scale: [1.0, 1.0],
            object_texture: 0,
            _padding: 0,
            material: MaterialUniform {
                ambient_color: [0.2, 0.2, 0.2],
                ambient_strength: 0.5,
                diffuse_color: [0.8, 0.8, 0.8],
                _padding: 0,
                specular_color: [1.0, 1.0, 1.0],
                shininess: 32.0,
            },
            light_sources: [bytemuck::Zeroable::zeroed(); MAX_LIGHTS],
        }
    }
}

/// The uniform state of the scene shader program.
///
/// Values persist until overwritten, exactly like GL program uniforms.
#[derive(Debug, Clone, Default)]
pub struct ShaderState {
    uniforms: ShaderUniforms,
}

impl ShaderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    pub fn model(&self) -> Matrix4<f32> {
        self.uniforms.model.into()
    }

    pub fn use_texture(&self) -> bool {
        self.uniforms.use_texture != 0
    }

    pub fn use_lighting(&self) -> bool {
        self.uniforms.use_lighting != 0
    }

    pub fn object_texture(&self) -> i32 {
        self.uniforms.object_texture
    }

    pub fn object_color(&self) -> Vector4<f32> {
        self.uniforms.object_color.into()
    }

    pub fn uv_scale(&self) -> Vector2<f32> {
        self.uniforms.uv_scale.into()
    }

    pub fn global_ambient(&self) -> Vector3<f32> {
        self.uniforms.global_ambient_color.into()
    }

    pub fn material(&self) -> &MaterialUniform {
        &self.uniforms.material
    }

    pub fn light(&self, index: usize) -> Option<&LightUniform> {
        self.uniforms.light_sources.get(index)
    }

    fn light_mut(&mut self, name: &str) -> Option<(&mut LightUniform, String)> {
        let (index, field) = parse_light_field(name)?;
        let light = self.uniforms.light_sources.get_mut(index)?;
        Some((light, field.to_string()))
    }
}

fn normal_matrix(model: &Matrix4<f32>) -> [[f32; 4]; 3] {
    let upper = Matrix3::from_cols(model.x.truncate(), model.y.truncate(), model.z.truncate());
    // singular models (a zero scale) keep their own upper 3x3
    let normal = upper.invert().map_or(upper, |inverse| inverse.transpose());
    [
        normal.x.extend(0.0).into(),
        normal.y.extend(0.0).into(),
        normal.z.extend(0.0).into(),
    ]
}

fn ignored(name: &str, kind: &str) {
    log::warn!("Uniform {:?} of type {} is not declared by the scene shader.", name, kind);
}

impl UniformBridge for ShaderState {
    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        match name {
            names::MODEL => {
                self.uniforms.model = value.into();
                self.uniforms.normal_matrix = normal_matrix(&value);
            }
            names::VIEW => self.uniforms.view = value.into(),
            names::PROJECTION => self.uniforms.projection = value.into(),
            _ => ignored(name, "mat4"),
        }
    }

    fn set_vec4(&mut self, name: &str, value: Vector4<f32>) {
        match name {
            names::OBJECT_COLOR => self.uniforms.object_color = value.into(),
            _ => ignored(name, "vec4"),
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        let value: [f32; 3] = value.into();
        match name {
            names::VIEW_POSITION => self.uniforms.view_position = value,
            names::GLOBAL_AMBIENT_COLOR => self.uniforms.global_ambient_color = value,
            names::material::AMBIENT_COLOR => self.uniforms.material.ambient_color = value,
            names::material::DIFFUSE_COLOR => self.uniforms.material.diffuse_color = value,
            names::material::SPECULAR_COLOR => self.uniforms.material.specular_color = value,
            _ => match self.light_mut(name) {
                Some((light, field)) => match field.as_str() {
                    names::light::POSITION => light.position = value,
                    names::light::DIFFUSE_COLOR => light.diffuse_color = value,
                    names::light::SPECULAR_COLOR => light.specular_color = value,
                    _ => ignored(name, "vec3"),
                },
                None => ignored(name, "vec3"),
            },
        }
    }

    fn set_vec2(&mut self, name: &str, value: Vector2<f32>) {
        match name {
            names::UV_SCALE => self.uniforms.uv_scale = value.into(),
            _ => ignored(name, "vec2"),
        }
    }

    fn set_float(&mut self, name: &str, value: f32) {
        match name {
            names::material::AMBIENT_STRENGTH => self.uniforms.material.ambient_strength = value,
            names::material::SHININESS => self.uniforms.material.shininess = value,
            _ => match self.light_mut(name) {
                Some((light, field)) => match field.as_str() {
                    names::light::FOCAL_STRENGTH => light.focal_strength = value,
                    names::light::SPECULAR_INTENSITY => light.specular_intensity = value,
                    _ => ignored(name, "float"),
                },
                None => ignored(name, "float"),
            },
        }
    }

    fn set_int(&mut self, name: &str, value: i32) {
        match name {
            names::USE_TEXTURE => self.uniforms.use_texture = value,
            names::USE_LIGHTING => self.uniforms.use_lighting = value,
            names::OBJECT_TEXTURE => self.uniforms.object_texture = value,
            _ => ignored(name, "int"),
        }
    }
}
