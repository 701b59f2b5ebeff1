//! Headless GPU context.
//!
//! Owns the device and queue, an offscreen color target with its depth
//! buffer, and the scene pipeline. Frames are rendered into the color target
//! and can be read back as an image.

use std::{iter, time::Duration};

use anyhow::{Context as _, anyhow};
use image::RgbaImage;

use crate::{
    data_structures::texture::Texture,
    pipelines::basic::ScenePipeline,
    render::Frame,
    resources::texture::{GpuTextures, RegistryState, TextureRegistry, texture_units_layout},
};

/// Size of the offscreen target and how to pick the adapter.
#[derive(Clone, Debug)]
pub struct ContextSettings {
    pub width: u32,
    pub height: u32,
    pub clear_colour: wgpu::Color,
    pub power_preference: wgpu::PowerPreference,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            clear_colour: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            power_preference: wgpu::PowerPreference::default(),
        }
    }
}

pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub clear_colour: wgpu::Color,
    pub pipeline: ScenePipeline,
    pub(crate) color_target: Texture,
    pub(crate) depth_texture: Texture,
    texture_layout: wgpu::BindGroupLayout,
    width: u32,
    height: u32,
}

impl Context {
    /// Blocking variant of [`Context::new_async`].
    pub fn new(settings: ContextSettings) -> anyhow::Result<Self> {
        futures::executor::block_on(Self::new_async(settings))
    }

    pub async fn new_async(settings: ContextSettings) -> anyhow::Result<Self> {
        let width = settings.width.max(1);
        let height = settings.height.max(1);

        log::info!("WGPU setup");
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("flow-shade device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("could not create the device")?;

        let color_target = create_color_target(&device, width, height);
        let depth_texture =
            Texture::create_depth_texture(&device, [width, height], "depth_texture");
        let texture_layout = texture_units_layout(&device);
        let pipeline = ScenePipeline::new(&device, Texture::COLOR_FORMAT, &texture_layout);

        Ok(Self {
            device,
            queue,
            clear_colour: settings.clear_colour,
            pipeline,
            color_target,
            depth_texture,
            texture_layout,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// A texture backend whose bind groups fit the scene pipeline.
    pub fn texture_backend(&self) -> GpuTextures {
        GpuTextures::new(&self.device, &self.queue, self.texture_layout.clone())
    }

    /// Clear the target and replay every draw of `frame`.
    pub fn render(&mut self, frame: &Frame, textures: &TextureRegistry<GpuTextures>) {
        if !textures.is_empty() && textures.state() != RegistryState::Bound {
            log::warn!("Rendering with textures that were loaded but never bound");
        }
        self.pipeline.prepare(&self.device, &self.queue, frame);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !frame.is_empty() {
                self.pipeline
                    .record(&mut render_pass, frame, textures.backend().bind_group());
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        log::debug!("Rendered {} draw call(s)", frame.len());
    }

    /// Copy the color target back to the CPU.
    pub fn read_pixels(&self) -> anyhow::Result<RgbaImage> {
        futures::executor::block_on(self.read_pixels_async())
    }

    async fn read_pixels_async(&self) -> anyhow::Result<RgbaImage> {
        let u32_size = std::mem::size_of::<u32>() as u32;
        let (width, height) = self.size();
        let unpadded_bytes_per_row = u32_size * width;
        let padded_bytes_per_row =
            wgpu::util::align_to(unpadded_bytes_per_row, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("Readback Buffer"),
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.color_target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // the receiver only goes away if reading was abandoned
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })
            .context("waiting for the readback failed")?;
        rx.receive()
            .await
            .ok_or_else(|| anyhow!("readback channel closed"))?
            .context("could not map the readback buffer")?;

        let data = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
        for row in data.chunks(padded_bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
        }
        drop(data);
        output_buffer.unmap();

        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow!("readback size does not match {}x{}", width, height))
    }
}

fn create_color_target(device: &wgpu::Device, width: u32, height: u32) -> Texture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("color_target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: Texture::COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Texture { texture, view }
}
