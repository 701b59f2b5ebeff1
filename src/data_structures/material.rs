//! Tagged material property sets.

use cgmath::Vector3;

/// Phong material parameters as the scene shader reads them from `material.*`.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub tag: String,
    pub ambient_color: Vector3<f32>,
    pub ambient_strength: f32,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    pub shininess: f32,
}

impl Material {
    /// A neutral grey material: dim ambient, light grey diffuse, white specular.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ambient_color: Vector3::new(0.2, 0.2, 0.2),
            ambient_strength: 0.5,
            diffuse_color: Vector3::new(0.8, 0.8, 0.8),
            specular_color: Vector3::new(1.0, 1.0, 1.0),
            shininess: 32.0,
        }
    }

    pub fn with_ambient(mut self, color: impl Into<Vector3<f32>>, strength: f32) -> Self {
        self.ambient_color = color.into();
        self.ambient_strength = strength;
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

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }
}

/// Ordered list of materials, looked up by tag.
///
/// Tags are not required to be unique. Lookups return the first material added
/// under a tag, so a later material with the same tag can never be found; adding
/// one logs a warning.
#[derive(Clone, Debug, Default)]
pub struct MaterialTable {
    materials: Vec<Material>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, material: Material) {
        if self.find(&material.tag).is_some() {
            log::warn!(
                "Material {:?} is already defined; the new definition will never be found.",
                material.tag
            );
        }
        self.materials.push(material);
    }

    /// First material tagged `tag`, or `None` when the table has none.
    pub fn find(&self, tag: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }
}

impl FromIterator<Material> for MaterialTable {
    fn from_iter<T: IntoIterator<Item = Material>>(iter: T) -> Self {
        let mut table = MaterialTable::new();
        for material in iter {
            table.add(material);
        }
        table
    }
}
