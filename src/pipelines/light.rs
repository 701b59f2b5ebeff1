//! Pushes a [`Lighting`] setup into the shader's fixed light array.

use crate::{
    data_structures::light::{Lighting, LightSource, MAX_LIGHTS},
    error::LightingError,
    pipelines::uniforms::{UniformBridge, names},
};

impl Lighting {
    /// Check the setup against the shader's light array without writing anything.
    pub fn validate(&self) -> Result<(), LightingError> {
        if self.lights.len() > MAX_LIGHTS {
            return Err(LightingError::TooManyLights {
                requested: self.lights.len(),
                capacity: MAX_LIGHTS,
            });
        }
        let mut seen = [false; MAX_LIGHTS];
        for light in &self.lights {
            let used = seen
                .get_mut(light.index)
                .ok_or(LightingError::IndexOutOfRange {
                    index: light.index,
                    capacity: MAX_LIGHTS,
                })?;
            if *used {
                return Err(LightingError::DuplicateIndex { index: light.index });
            }
            *used = true;
        }
        Ok(())
    }

    /// Enable lighting and write the ambient color and every light.
    ///
    /// A setup that does not fit the light array is rejected before the first
    /// write. Entries without a configured light keep whatever they held.
    pub fn apply(&self, bridge: &mut impl UniformBridge) -> Result<(), LightingError> {
        self.validate()?;

        bridge.set_bool(names::USE_LIGHTING, true);
        bridge.set_vec3(names::GLOBAL_AMBIENT_COLOR, self.global_ambient);
        for light in &self.lights {
            write_light(bridge, light);
        }
        log::debug!("Applied {} light(s)", self.lights.len());
        Ok(())
    }

    /// Switch the shader to unlit drawing.
    pub fn disable(bridge: &mut impl UniformBridge) {
        bridge.set_bool(names::USE_LIGHTING, false);
    }
}

fn write_light(bridge: &mut impl UniformBridge, light: &LightSource) {
    let field = |name| names::light_source(light.index, name);
    bridge.set_vec3(&field(names::light::POSITION), light.position);
    bridge.set_vec3(&field(names::light::DIFFUSE_COLOR), light.diffuse_color);
    bridge.set_vec3(&field(names::light::SPECULAR_COLOR), light.specular_color);
    bridge.set_float(&field(names::light::FOCAL_STRENGTH), light.focal_strength);
    bridge.set_float(&field(names::light::SPECULAR_INTENSITY), light.specular_intensity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::scene::ShaderState;
    use cgmath::Vector3;

    #[test]
    fn apply_writes_every_light_field() {
        let mut state = ShaderState::new();
        let lighting = Lighting::new([0.1, 0.2, 0.3]).with_light(
            LightSource::new(1)
                .with_position([1.0, 2.0, 3.0])
                .with_diffuse([0.5, 0.5, 0.5])
                .with_specular([0.0, 1.0, 0.0])
                .with_focal_strength(16.0)
                .with_specular_intensity(0.7),
        );

        lighting.apply(&mut state).unwrap();

        assert!(state.use_lighting());
        assert_eq!(state.global_ambient(), Vector3::new(0.1, 0.2, 0.3));
        let light = state.light(1).unwrap();
        assert_eq!(light.position, [1.0, 2.0, 3.0]);
        assert_eq!(light.diffuse_color, [0.5, 0.5, 0.5]);
        assert_eq!(light.specular_color, [0.0, 1.0, 0.0]);
        assert_eq!(light.focal_strength, 16.0);
        assert_eq!(light.specular_intensity, 0.7);
        // untouched entry
        assert_eq!(state.light(0).unwrap().focal_strength, 0.0);
    }

    #[test]
    fn rejected_setups_write_nothing() {
        let too_many = (0..=MAX_LIGHTS).fold(Lighting::default(), |l, i| {
            l.with_light(LightSource::new(i % MAX_LIGHTS))
        });
        let out_of_range = Lighting::default().with_light(LightSource::new(MAX_LIGHTS));
        let duplicate = Lighting::default()
            .with_light(LightSource::new(2))
            .with_light(LightSource::new(2));

        let cases = [
            (
                too_many,
                LightingError::TooManyLights {
                    requested: 5,
                    capacity: MAX_LIGHTS,
                },
            ),
            (
                out_of_range,
                LightingError::IndexOutOfRange {
                    index: MAX_LIGHTS,
                    capacity: MAX_LIGHTS,
                },
            ),
            (duplicate, LightingError::DuplicateIndex { index: 2 }),
        ];

        for (lighting, expected) in cases {
            let mut state = ShaderState::new();
            let before = *state.uniforms();
            assert_eq!(lighting.apply(&mut state), Err(expected));
            assert_eq!(*state.uniforms(), before);
        }
    }

    #[test]
    fn disable_turns_lighting_off() {
        let mut state = ShaderState::new();
        Lighting::default().apply(&mut state).unwrap();
        Lighting::disable(&mut state);
        assert!(!state.use_lighting());
    }
}
