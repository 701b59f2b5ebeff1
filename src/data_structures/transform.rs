//! Object transforms for single draw calls.
//!
//! A [`Transform`] is built for one draw and turned into the `model` matrix
//! right away; nothing here is stored or parented.

use cgmath::{Deg, Matrix4, Vector3};

/// Scale, per-axis rotation in degrees and translation of one drawn object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: Vector3<f32>,
    /// Rotation around X, Y and Z in degrees. X is applied first.
    pub rotation_degrees: Vector3<f32>,
    pub translation: Vector3<f32>,
}

impl Transform {
    pub fn new(
        scale: impl Into<Vector3<f32>>,
        rotation_degrees: impl Into<Vector3<f32>>,
        translation: impl Into<Vector3<f32>>,
    ) -> Self {
        Self {
            scale: scale.into(),
            rotation_degrees: rotation_degrees.into(),
            translation: translation.into(),
        }
    }

    /// No scaling, no rotation, no translation.
    pub fn identity() -> Self {
        Self::new([1.0, 1.0, 1.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0])
    }

    /// `Translate * RotateZ * RotateY * RotateX * Scale`
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let scale = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        let rotation_x = Matrix4::from_angle_x(Deg(self.rotation_degrees.x));
        let rotation_y = Matrix4::from_angle_y(Deg(self.rotation_degrees.y));
        let rotation_z = Matrix4::from_angle_z(Deg(self.rotation_degrees.z));
        let translation = Matrix4::from_translation(self.translation);

        translation * rotation_z * rotation_y * rotation_x * scale
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Transform> for Matrix4<f32> {
    fn from(transform: Transform) -> Self {
        transform.to_matrix()
    }
}

/// Shorthand for `Transform::new(..).to_matrix()`.
pub fn compose(
    scale: impl Into<Vector3<f32>>,
    rotation_degrees: impl Into<Vector3<f32>>,
    translation: impl Into<Vector3<f32>>,
) -> Matrix4<f32> {
    Transform::new(scale, rotation_degrees, translation).to_matrix()
}
