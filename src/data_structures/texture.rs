//! GPU textures and texture creation utilities.
//!
//! This module provides [`DecodedImage`], the CPU side of a texture after
//! decoding, flipping and mip generation, and [`Texture`], a wrapper around the
//! WGPU texture created from it. Depth targets and the 1x1 placeholder bound to
//! unused texture units are created here as well.

use std::path::Path;

use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::error::TextureError;

/// An image ready for upload: flipped so row 0 is the bottom row, expanded to
/// RGBA8, with every mip level down to 1x1.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Channel count of the source file, either 3 or 4.
    pub channels: u8,
    /// Level 0 first.
    pub mips: Vec<RgbaImage>,
}

impl DecodedImage {
    /// Decode raw image file contents. `path` is only used for error messages.
    pub fn decode(bytes: &[u8], path: &Path) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_image(img, path)
    }

    pub fn from_image(img: DynamicImage, path: &Path) -> Result<Self, TextureError> {
        let channels = img.color().channel_count();
        if channels != 3 && channels != 4 {
            return Err(TextureError::UnsupportedChannels {
                path: path.to_path_buf(),
                channels,
            });
        }
        // texture coordinates start at the bottom left
        let base = img.flipv().to_rgba8();
        Ok(Self {
            channels,
            mips: mip_chain(base),
        })
    }

    pub fn width(&self) -> u32 {
        self.mips[0].width()
    }

    pub fn height(&self) -> u32 {
        self.mips[0].height()
    }

    pub fn mip_level_count(&self) -> u32 {
        self.mips.len() as u32
    }

    /// Reject images with a side longer than `max` texels.
    pub fn ensure_fits(&self, tag: &str, max: u32) -> Result<(), TextureError> {
        let (width, height) = (self.width(), self.height());
        if width > max || height > max {
            return Err(TextureError::TooLarge {
                tag: tag.to_string(),
                width,
                height,
                max,
            });
        }
        Ok(())
    }
}

fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let mut mips = vec![base];
    loop {
        let last = &mips[mips.len() - 1];
        let (width, height) = last.dimensions();
        if width <= 1 && height <= 1 {
            break;
        }
        let next = image::imageops::resize(
            last,
            (width / 2).max(1),
            (height / 2).max(1),
            FilterType::Triangle,
        );
        mips.push(next);
    }
    mips
}

/// A GPU texture with its default view.
///
/// Scene textures are sampled through the one sampler owned by the texture
/// backend.
#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    /// Format of scene textures and the color target. Texels reach the
    /// shader as stored, without sRGB decoding.
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }

    /// A solid white 1x1 texture for texture units nothing is bound to.
    pub fn create_placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let decoded = DecodedImage {
            channels: 4,
            mips: vec![white],
        };
        Self::from_decoded(device, queue, &decoded, "placeholder texture")
    }

    /// Upload every mip level of `image` into a new 2D texture.
    pub fn from_decoded(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: image.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, mip) in image.mips.iter().enumerate() {
            let (width, height) = mip.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                mip.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Repeat on both axes, linear filtering between texels and mip levels.
pub fn create_scene_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("scene texture sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}
