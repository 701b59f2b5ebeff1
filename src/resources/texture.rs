//! Tag-addressed texture registry.
//!
//! [`TextureRegistry`] decodes image files, hands them to a [`TextureBackend`]
//! and remembers each texture under its tag together with the texture unit
//! (slot) it occupies. Slots are assigned in load order and never move until
//! the registry is released.

use std::path::Path;

use crate::{
    data_structures::texture::{DecodedImage, Texture, create_scene_sampler},
    error::TextureError,
    resources::asset_path,
};

/// Number of texture units the scene shader exposes.
pub const MAX_TEXTURE_SLOTS: usize = 16;
/// Binding of the shared sampler inside the texture bind group.
pub const SAMPLER_BINDING: u32 = MAX_TEXTURE_SLOTS as u32;

/// Creates, binds and destroys GPU textures on behalf of the registry.
pub trait TextureBackend {
    type Handle;

    /// Upload a decoded image and return the handle of the new texture.
    ///
    /// Images the backend cannot hold are rejected before any GPU call.
    fn create(&mut self, image: &DecodedImage, tag: &str) -> Result<Self::Handle, TextureError>;
    /// Make `handle` the texture sampled through unit `slot`.
    fn bind(&mut self, slot: usize, handle: &Self::Handle);
    /// Destroy the texture occupying `slot`.
    fn release(&mut self, slot: usize, handle: Self::Handle);
}

#[derive(Debug)]
pub struct TextureRecord<H> {
    pub tag: String,
    pub handle: H,
    pub slot: usize,
}

/// Lifecycle of a [`TextureRegistry`].
///
/// Textures can only be used for drawing once they are `Bound`. Loading
/// another texture afterwards falls back to `Loaded` until the next bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryState {
    Empty,
    Loaded,
    Bound,
}

pub struct TextureRegistry<B: TextureBackend> {
    backend: B,
    records: Vec<TextureRecord<B::Handle>>,
    state: RegistryState,
}

impl<B: TextureBackend> TextureRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            records: Vec::with_capacity(MAX_TEXTURE_SLOTS),
            state: RegistryState::Empty,
        }
    }

    /// Load the image at `path` and register it under `tag`.
    ///
    /// Relative paths that do not exist are looked up in the asset directory.
    /// Returns the slot of the new texture. On error the registry is unchanged.
    pub fn load(&mut self, path: impl AsRef<Path>, tag: &str) -> Result<usize, TextureError> {
        if self.records.len() >= MAX_TEXTURE_SLOTS {
            return Err(TextureError::CapacityExceeded {
                tag: tag.to_string(),
                capacity: MAX_TEXTURE_SLOTS,
            });
        }
        if let Some(slot) = self.resolve_slot(tag) {
            return Err(TextureError::DuplicateTag {
                tag: tag.to_string(),
                slot,
            });
        }

        let path = asset_path(path);
        let bytes = std::fs::read(&path).map_err(|source| TextureError::Io {
            path: path.clone(),
            source,
        })?;
        let image = DecodedImage::decode(&bytes, &path)?;

        let handle = self.backend.create(&image, tag)?;
        let slot = self.records.len();
        self.records.push(TextureRecord {
            tag: tag.to_string(),
            handle,
            slot,
        });
        self.state = RegistryState::Loaded;

        log::info!(
            "Loaded image {}, width: {}, height: {}, channels: {}",
            path.display(),
            image.width(),
            image.height(),
            image.channels
        );
        Ok(slot)
    }

    /// Load every `(path, tag)` pair, logging the ones that fail, then bind.
    ///
    /// Returns how many textures were loaded.
    pub fn load_all<P: AsRef<Path>>(&mut self, entries: &[(P, &str)]) -> usize {
        let mut loaded = 0;
        for (path, tag) in entries {
            match self.load(path, tag) {
                Ok(_) => loaded += 1,
                Err(e) => log::error!("Could not load texture {:?}: {}", tag, e),
            }
        }
        self.bind_all();
        loaded
    }

    /// Bind every texture to the unit matching its slot.
    ///
    /// An empty registry becomes `Bound` as well, so later lookups report the
    /// missing tag instead of a missing bind.
    pub fn bind_all(&mut self) {
        for record in &self.records {
            self.backend.bind(record.slot, &record.handle);
        }
        self.state = RegistryState::Bound;
    }

    pub fn resolve_id(&self, tag: &str) -> Option<&B::Handle> {
        self.find(tag).map(|record| &record.handle)
    }

    pub fn resolve_slot(&self, tag: &str) -> Option<usize> {
        self.find(tag).map(|record| record.slot)
    }

    /// Destroy every texture. Slots restart at 0 afterwards.
    pub fn release_all(&mut self) {
        for record in self.records.drain(..) {
            self.backend.release(record.slot, record.handle);
        }
        self.state = RegistryState::Empty;
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureRecord<B::Handle>> {
        self.records.iter()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn find(&self, tag: &str) -> Option<&TextureRecord<B::Handle>> {
        self.records.iter().find(|record| record.tag == tag)
    }
}

impl<B: TextureBackend> Drop for TextureRegistry<B> {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// Bind group layout with one `texture_2d<f32>` per unit and the shared sampler.
pub fn texture_units_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries: Vec<_> = (0..MAX_TEXTURE_SLOTS as u32)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        })
        .collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: SAMPLER_BINDING,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some("texture_units_bind_group_layout"),
    })
}

/// wgpu implementation of [`TextureBackend`].
///
/// Keeps the bind group the scene pipeline samples from in sync with the
/// bound units; units without a texture show a white placeholder.
pub struct GpuTextures {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    placeholder: Texture,
    units: Vec<Option<wgpu::TextureView>>,
    bind_group: wgpu::BindGroup,
}

impl GpuTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, layout: wgpu::BindGroupLayout) -> Self {
        let sampler = create_scene_sampler(device);
        let placeholder = Texture::create_placeholder(device, queue);
        let units = vec![None; MAX_TEXTURE_SLOTS];
        let bind_group = mk_units_bind_group(device, &layout, &sampler, &placeholder, &units);
        Self {
            device: device.clone(),
            queue: queue.clone(),
            layout,
            sampler,
            placeholder,
            units,
            bind_group,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    fn rebuild(&mut self) {
        self.bind_group = mk_units_bind_group(
            &self.device,
            &self.layout,
            &self.sampler,
            &self.placeholder,
            &self.units,
        );
    }
}

impl TextureBackend for GpuTextures {
    type Handle = Texture;

    fn create(&mut self, image: &DecodedImage, tag: &str) -> Result<Texture, TextureError> {
        image.ensure_fits(tag, self.device.limits().max_texture_dimension_2d)?;
        Ok(Texture::from_decoded(&self.device, &self.queue, image, tag))
    }

    fn bind(&mut self, slot: usize, handle: &Texture) {
        let Some(unit) = self.units.get_mut(slot) else {
            log::warn!("Texture unit {} does not exist", slot);
            return;
        };
        *unit = Some(handle.view.clone());
        self.rebuild();
    }

    fn release(&mut self, slot: usize, handle: Texture) {
        if let Some(unit) = self.units.get_mut(slot) {
            *unit = None;
        }
        self.rebuild();
        handle.texture.destroy();
    }
}

fn mk_units_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    placeholder: &Texture,
    units: &[Option<wgpu::TextureView>],
) -> wgpu::BindGroup {
    let mut entries: Vec<_> = units
        .iter()
        .enumerate()
        .map(|(binding, view)| wgpu::BindGroupEntry {
            binding: binding as u32,
            resource: wgpu::BindingResource::TextureView(
                view.as_ref().unwrap_or(&placeholder.view),
            ),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: SAMPLER_BINDING,
        resource: wgpu::BindingResource::Sampler(sampler),
    });

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &entries,
        label: Some("texture_units_bind_group"),
    })
}
