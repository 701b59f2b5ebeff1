use crate::{
    data_structures::{
        texture::Texture,
        vertex::{ShapeVertex, Vertex},
    },
    pipelines::scene::{SHADER_UNIFORMS_SIZE, ShaderUniforms},
    render::Frame,
};

/// The one pipeline every scene object is drawn with.
///
/// Group 0 holds the per-draw [`ShaderUniforms`] behind a dynamic offset, one
/// `stride` sized slot per recorded draw. Group 1 holds the texture units and
/// is owned by the texture backend.
pub struct ScenePipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    stride: u32,
    capacity: u32,
}

impl ScenePipeline {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = uniform_stride(min_alignment);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(SHADER_UNIFORMS_SIZE as u64),
                },
                count: None,
            }],
        });

        let uniform_buffer = mk_uniform_buffer(device, stride, 1);
        let uniform_bind_group = mk_uniform_bind_group(device, &uniform_layout, &uniform_buffer);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[Some(&uniform_layout), Some(texture_layout)],
            immediate_size: 0,
        });

        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        };

        let render_pipeline = mk_render_pipeline(
            device,
            &layout,
            color_format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            Some(Texture::DEPTH_FORMAT),
            &[ShapeVertex::desc()],
            shader,
        );

        Self {
            render_pipeline,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            stride,
            capacity: 1,
        }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Number of draws the uniform buffer currently has room for.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Upload every snapshot of `frame`, growing the uniform buffer if needed.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &Frame) {
        if frame.is_empty() {
            return;
        }
        self.ensure_capacity(device, frame.len() as u32);
        let bytes = pack_snapshots(frame.snapshots(), self.stride);
        queue.write_buffer(&self.uniform_buffer, 0, &bytes);
    }

    /// Record one draw per snapshot. `prepare` must have been called with the same frame.
    pub fn record(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        frame: &Frame,
        texture_bind_group: &wgpu::BindGroup,
    ) {
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(1, texture_bind_group, &[]);
        for (index, draw) in frame.draws().enumerate() {
            pass.set_bind_group(0, &self.uniform_bind_group, &[index as u32 * self.stride]);
            draw.mesh.draw(pass);
        }
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, required_count: u32) {
        if required_count <= self.capacity {
            return;
        }

        let mut capacity = self.capacity.max(1);
        while capacity < required_count {
            capacity = capacity.saturating_mul(2);
        }
        log::debug!("Growing scene uniform buffer to {} draws", capacity);

        self.uniform_buffer = mk_uniform_buffer(device, self.stride, capacity);
        self.uniform_bind_group =
            mk_uniform_bind_group(device, &self.uniform_layout, &self.uniform_buffer);
        self.capacity = capacity;
    }
}

/// Size of one uniform slot: the block size rounded up to the offset alignment.
pub fn uniform_stride(min_alignment: u32) -> u32 {
    wgpu::util::align_to(SHADER_UNIFORMS_SIZE as u32, min_alignment.max(1))
}

/// Lay the snapshots out back to back, each starting on a `stride` boundary.
pub fn pack_snapshots<'a>(
    snapshots: impl ExactSizeIterator<Item = &'a ShaderUniforms>,
    stride: u32,
) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; stride * snapshots.len()];
    for (index, snapshot) in snapshots.enumerate() {
        let offset = index * stride;
        bytes[offset..offset + SHADER_UNIFORMS_SIZE].copy_from_slice(bytemuck::bytes_of(snapshot));
    }
    bytes
}

fn mk_uniform_buffer(device: &wgpu::Device, stride: u32, capacity: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Uniform Buffer"),
        size: u64::from(stride) * u64::from(capacity),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn mk_uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("scene_uniform_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: wgpu::BufferSize::new(SHADER_UNIFORMS_SIZE as u64),
            }),
        }],
    })
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // shapes come from outside and are not guaranteed to be wound consistently
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
