//! Named uniform writes against the active shader program.
//!
//! Every component that talks to the shader does so through [`UniformBridge`]
//! using the names in [`names`]. Writes are fire-and-forget: nothing is
//! batched, diffed or read back, so a draw must re-specify everything it
//! depends on.

use cgmath::{Matrix4, Vector2, Vector3, Vector4};

/// Uniform names the scene shader declares.
pub mod names {
    pub const MODEL: &str = "model";
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    pub const VIEW_POSITION: &str = "viewPosition";
    pub const OBJECT_COLOR: &str = "objectColor";
    pub const OBJECT_TEXTURE: &str = "objectTexture";
    pub const USE_TEXTURE: &str = "bUseTexture";
    pub const USE_LIGHTING: &str = "bUseLighting";
    pub const UV_SCALE: &str = "UVscale";
    pub const GLOBAL_AMBIENT_COLOR: &str = "globalAmbientColor";

    pub mod material {
        pub const AMBIENT_COLOR: &str = "material.ambientColor";
        pub const AMBIENT_STRENGTH: &str = "material.ambientStrength";
        pub const DIFFUSE_COLOR: &str = "material.diffuseColor";
        pub const SPECULAR_COLOR: &str = "material.specularColor";
        pub const SHININESS: &str = "material.shininess";
    }

    /// Field names inside one `lightSources[i]` entry.
    pub mod light {
        pub const ARRAY: &str = "lightSources";
        pub const POSITION: &str = "position";
        pub const DIFFUSE_COLOR: &str = "diffuseColor";
        pub const SPECULAR_COLOR: &str = "specularColor";
        pub const FOCAL_STRENGTH: &str = "focalStrength";
        pub const SPECULAR_INTENSITY: &str = "specularIntensity";
    }

    /// `lightSources[index].field`
    pub fn light_source(index: usize, field: &str) -> String {
        format!("{}[{}].{}", light::ARRAY, index, field)
    }
}

/// Sampler slot written when a texture tag could not be resolved.
pub const SLOT_SENTINEL: i32 = -1;

/// Typed, named uniform writes.
///
/// Implementations ignore names they do not know (and values of the wrong
/// type), logging a warning instead, the same way a GL program ignores a
/// uniform location of -1.
pub trait UniformBridge {
    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>);
    fn set_vec4(&mut self, name: &str, value: Vector4<f32>);
    fn set_vec3(&mut self, name: &str, value: Vector3<f32>);
    fn set_vec2(&mut self, name: &str, value: Vector2<f32>);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i32);

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_int(name, value as i32);
    }

    /// Point a sampler uniform at texture unit `slot`.
    fn set_sampler2d(&mut self, name: &str, slot: i32) {
        self.set_int(name, slot);
    }
}

/// Splits `lightSources[2].position` into `(2, "position")`.
pub(crate) fn parse_light_field(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix(names::light::ARRAY)?.strip_prefix('[')?;
    let (index, field) = rest.split_once("].")?;
    let index = index.parse().ok()?;
    Some((index, field))
}
