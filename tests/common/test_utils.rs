use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use cgmath::{Matrix4, Vector2, Vector3, Vector4};
use flow_shade::{
    TextureError,
    data_structures::texture::DecodedImage,
    pipelines::uniforms::UniformBridge,
    resources::texture::TextureBackend,
};
use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

/// What the backend was asked to do, in order.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum BackendEvent {
    Create {
        id: u32,
        tag: String,
        width: u32,
        height: u32,
        mips: u32,
    },
    Bind { slot: usize, id: u32 },
    Release { slot: usize, id: u32 },
}

#[derive(Debug, PartialEq)]
pub(crate) struct FakeTexture {
    pub(crate) id: u32,
    pub(crate) tag: String,
}

/// Texture backend that only records calls. The log is shared so it can be
/// inspected after the registry owning the backend was dropped.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    next_id: u32,
    max_dimension: Option<u32>,
    pub(crate) events: Rc<RefCell<Vec<BackendEvent>>>,
}

impl RecordingBackend {
    pub(crate) fn new() -> (Self, Rc<RefCell<Vec<BackendEvent>>>) {
        let backend = Self::default();
        let events = backend.events.clone();
        (backend, events)
    }

    /// A backend that, like a device, refuses images larger than `max` per side.
    pub(crate) fn with_max_dimension(max: u32) -> (Self, Rc<RefCell<Vec<BackendEvent>>>) {
        let (mut backend, events) = Self::new();
        backend.max_dimension = Some(max);
        (backend, events)
    }
}

impl TextureBackend for RecordingBackend {
    type Handle = FakeTexture;

    fn create(&mut self, image: &DecodedImage, tag: &str) -> Result<FakeTexture, TextureError> {
        if let Some(max) = self.max_dimension {
            image.ensure_fits(tag, max)?;
        }
        self.next_id += 1;
        self.events.borrow_mut().push(BackendEvent::Create {
            id: self.next_id,
            tag: tag.to_string(),
            width: image.width(),
            height: image.height(),
            mips: image.mip_level_count(),
        });
        Ok(FakeTexture {
            id: self.next_id,
            tag: tag.to_string(),
        })
    }

    fn bind(&mut self, slot: usize, handle: &FakeTexture) {
        self.events
            .borrow_mut()
            .push(BackendEvent::Bind { slot, id: handle.id });
    }

    fn release(&mut self, slot: usize, handle: FakeTexture) {
        self.events
            .borrow_mut()
            .push(BackendEvent::Release { slot, id: handle.id });
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum UniformValue {
    Mat4(Matrix4<f32>),
    Vec4(Vector4<f32>),
    Vec3(Vector3<f32>),
    Vec2(Vector2<f32>),
    Float(f32),
    Int(i32),
}

/// Uniform bridge that keeps every write in order.
#[derive(Default)]
pub(crate) struct RecordingBridge {
    pub(crate) writes: Vec<(String, UniformValue)>,
}

impl RecordingBridge {
    /// The most recent value written to `name`.
    pub(crate) fn last(&self, name: &str) -> Option<&UniformValue> {
        self.writes
            .iter()
            .rev()
            .find(|(written, _)| written == name)
            .map(|(_, value)| value)
    }

    pub(crate) fn written_names(&self) -> Vec<&str> {
        self.writes.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl UniformBridge for RecordingBridge {
    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        self.writes.push((name.to_string(), UniformValue::Mat4(value)));
    }

    fn set_vec4(&mut self, name: &str, value: Vector4<f32>) {
        self.writes.push((name.to_string(), UniformValue::Vec4(value)));
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.writes.push((name.to_string(), UniformValue::Vec3(value)));
    }

    fn set_vec2(&mut self, name: &str, value: Vector2<f32>) {
        self.writes.push((name.to_string(), UniformValue::Vec2(value)));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.writes.push((name.to_string(), UniformValue::Float(value)));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.writes.push((name.to_string(), UniformValue::Int(value)));
    }
}

/// Image files written to a per-test temp directory, removed on drop.
pub(crate) struct Fixtures {
    dir: PathBuf,
}

impl Fixtures {
    pub(crate) fn new(test_name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "flow-shade-{}-{}",
            std::process::id(),
            test_name
        ));
        std::fs::create_dir_all(&dir).expect("failed to create fixture dir");
        Self { dir }
    }

    pub(crate) fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub(crate) fn rgb(&self, file_name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.path(file_name);
        RgbImage::from_pixel(width, height, Rgb([200, 100, 50]))
            .save(&path)
            .expect("failed to write rgb fixture");
        path
    }

    pub(crate) fn rgba(
        &self,
        file_name: &str,
        width: u32,
        height: u32,
        colour: [u8; 4],
    ) -> PathBuf {
        let path = self.path(file_name);
        RgbaImage::from_pixel(width, height, Rgba(colour))
            .save(&path)
            .expect("failed to write rgba fixture");
        path
    }

    pub(crate) fn gray(&self, file_name: &str) -> PathBuf {
        let path = self.path(file_name);
        GrayImage::from_pixel(4, 4, Luma([128]))
            .save(&path)
            .expect("failed to write gray fixture");
        path
    }

    pub(crate) fn garbage(&self, file_name: &str) -> PathBuf {
        let path = self.path(file_name);
        std::fs::write(&path, b"not an image at all").expect("failed to write garbage fixture");
        path
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for Fixtures {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) fn headless_context(width: u32, height: u32) -> flow_shade::context::Context {
    flow_shade::init_logger();
    flow_shade::context::Context::new(flow_shade::context::ContextSettings {
        width,
        height,
        ..Default::default()
    })
    .expect("Failed to create a headless context for integration test.")
}

/// A quad covering the whole clip space at depth 0.5.
#[cfg(feature = "integration-tests")]
pub(crate) fn screen_quad(device: &wgpu::Device) -> flow_shade::render::BufferMesh {
    use flow_shade::data_structures::vertex::ShapeVertex;

    let vertex = |x: f32, y: f32, u: f32, v: f32| ShapeVertex {
        position: [x, y, 0.5],
        normal: [0.0, 0.0, 1.0],
        tex_coords: [u, v],
    };
    let vertices = [
        vertex(-1.0, -1.0, 0.0, 0.0),
        vertex(1.0, -1.0, 1.0, 0.0),
        vertex(1.0, 1.0, 1.0, 1.0),
        vertex(-1.0, 1.0, 0.0, 1.0),
    ];
    flow_shade::render::BufferMesh::new(device, "screen quad", &vertices, &[0, 1, 2, 0, 2, 3])
}

#[cfg(feature = "integration-tests")]
pub(crate) fn assert_all_pixels(image: &RgbaImage, expected: [u8; 4], tolerance: u8) {
    for (x, y, pixel) in image.enumerate_pixels() {
        for channel in 0..4 {
            assert!(
                pixel.0[channel].abs_diff(expected[channel]) <= tolerance,
                "pixel mismatch at ({}, {}): {:?} != {:?}",
                x,
                y,
                pixel.0,
                expected
            );
        }
    }
}
