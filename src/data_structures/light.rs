//! Point light descriptors and the scene-wide lighting setup.
//!
//! Writing these into the shader happens in [`crate::pipelines::light`].

use cgmath::Vector3;

/// Number of entries in the shader's `lightSources` array.
pub const MAX_LIGHTS: usize = 4;

/// One entry of the shader's light array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    /// Position in `lightSources[index]`.
    pub index: usize,
    pub position: Vector3<f32>,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    /// Specular exponent; higher values give a tighter highlight.
    pub focal_strength: f32,
    pub specular_intensity: f32,
}

impl LightSource {
    /// A white light at the origin.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            position: Vector3::new(0.0, 0.0, 0.0),
            diffuse_color: Vector3::new(1.0, 1.0, 1.0),
            specular_color: Vector3::new(1.0, 1.0, 1.0),
            focal_strength: 32.0,
            specular_intensity: 0.2,
        }
    }

    pub fn with_position(mut self, position: impl Into<Vector3<f32>>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_diffuse(mut self, color: impl Into<Vector3<f32>>) -> Self {
        self.diffuse_color = color.into();
        self
    }

    pub fn with_specular(mut self, color: impl Into<Vector3<f32>>) -> Self {
        self.specular_color = color.into();
        self
    }

    pub fn with_focal_strength(mut self, focal_strength: f32) -> Self {
        self.focal_strength = focal_strength;
        self
    }

    pub fn with_specular_intensity(mut self, intensity: f32) -> Self {
        self.specular_intensity = intensity;
        self
    }
}

/// Global ambient color plus the lights of a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Lighting {
    pub global_ambient: Vector3<f32>,
    pub lights: Vec<LightSource>,
}

impl Lighting {
    pub fn new(global_ambient: impl Into<Vector3<f32>>) -> Self {
        Self {
            global_ambient: global_ambient.into(),
            lights: Vec::new(),
        }
    }

    pub fn push(&mut self, light: LightSource) -> &mut Self {
        self.lights.push(light);
        self
    }

    pub fn with_light(mut self, light: LightSource) -> Self {
        self.lights.push(light);
        self
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::new([0.2, 0.2, 0.2])
    }
}
