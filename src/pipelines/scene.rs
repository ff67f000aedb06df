//! GPU side of the scene.
//!
//! [`GpuScene`] mirrors the [`Assets`] library on the device (one vertex and
//! index buffer per mesh, one texture per texture, one uniform buffer and bind
//! group per material, one pipeline per program) and implements
//! [`DrawBackend`]. The draw pass only records commands; [`GpuScene::encode`]
//! uploads the frame and per-object uniforms and replays the commands into a
//! render pass.
//!
//! Bind groups: 0 frame uniforms, 1 material uniforms and textures, 2 object
//! uniforms at a dynamic offset into one shared buffer.

use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        material::{Material, ShaderKind, TEXTURE_SLOTS},
        mesh::Vertex,
        texture::Texture,
        uniform::{UniformBlock, UniformLayout, UniformValue},
    },
    pipelines::{mk_render_pipeline, program_source, sampler_entry, texture_entry, uniform_entry},
    render::{DrawBackend, FrameUniforms, ObjectUniforms},
    resources::{Assets, MaterialId, MeshId, ShaderId, texture::TextureData},
};

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

#[derive(Clone, Copy, Debug)]
enum DrawCommand {
    Pipeline(ShaderId),
    Material(MaterialId),
    Mesh { mesh: MeshId, offset: u32 },
}

pub struct GpuScene {
    pipelines: Vec<wgpu::RenderPipeline>,
    meshes: Vec<GpuMesh>,
    textures: Vec<Texture>,
    materials: Vec<GpuMaterial>,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_stride: usize,
    frame_staging: Option<UniformBlock>,
    object_staging: Vec<u8>,
    commands: Vec<DrawCommand>,
}

fn layout_size(layout: &UniformLayout) -> Option<wgpu::BufferSize> {
    NonZeroU64::new(layout.size() as u64)
}

fn mk_object_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Object Uniform Buffer"),
        size: capacity as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: layout_size(UniformLayout::object()),
            }),
        }],
        label: Some("object_bind_group"),
    });
    (buffer, bind_group)
}

fn mk_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, false, layout_size(UniformLayout::material())),
            texture_entry(1, wgpu::TextureViewDimension::D2),
            texture_entry(2, wgpu::TextureViewDimension::D2),
            texture_entry(3, wgpu::TextureViewDimension::D2),
            texture_entry(4, wgpu::TextureViewDimension::D2),
            texture_entry(5, wgpu::TextureViewDimension::Cube),
            sampler_entry(6),
            sampler_entry(7),
        ],
        label: Some("material_bind_group_layout"),
    })
}

impl GpuScene {
    /// Upload every asset and build one pipeline per program.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat, assets: &Assets) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0, false, layout_size(UniformLayout::frame()))],
            label: Some("frame_bind_group_layout"),
        });
        let material_layout = mk_material_layout(device);
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0, true, layout_size(UniformLayout::object()))],
            label: Some("object_bind_group_layout"),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[Some(&frame_layout), Some(&material_layout), Some(&object_layout)],
            immediate_size: 0,
        });

        let pipelines = assets
            .shaders()
            .map(|(_, program)| {
                let kind = program.kind();
                let source = program_source(kind);
                mk_render_pipeline(
                    device,
                    kind.label(),
                    &pipeline_layout,
                    format,
                    Some(wgpu::BlendState::ALPHA_BLENDING),
                    Some(wgpu::DepthStencilState {
                        format: Texture::DEPTH_FORMAT,
                        // the skybox sits on the far plane behind everything
                        depth_write_enabled: Some(kind != ShaderKind::Skybox),
                        depth_compare: Some(wgpu::CompareFunction::LessEqual),
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    &[Vertex::desc()],
                    Some(wgpu::Face::Back),
                    wgpu::ShaderModuleDescriptor {
                        label: Some(kind.label()),
                        source: wgpu::ShaderSource::Wgsl(source.into()),
                    },
                )
            })
            .collect();

        let meshes = assets
            .meshes()
            .map(|(_, mesh)| GpuMesh {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Vertex Buffer", mesh.name)),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Index Buffer", mesh.name)),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.indices.len() as u32,
            })
            .collect();

        let textures: Vec<Texture> = assets
            .textures()
            .map(|(_, data)| Texture::from_data(device, queue, data))
            .collect();

        let fallback_image = Texture::from_data(device, queue, &TextureData::solid("fallback", [255, 255, 255, 255]));
        let fallback_cube = Texture::from_data(device, queue, &TextureData::solid_cube("fallback cube", [0, 0, 0, 255]));
        let materials = assets
            .materials()
            .map(|(_, material)| {
                let program = assets.shader(material.shader);
                let block = material.resolve(program);
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Material Buffer", material.name)),
                    contents: block.bytes(),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let slots = MaterialTextures::resolve(material, &textures, &fallback_image, &fallback_cube);
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &material_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&slots.images[0].view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(&slots.images[1].view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::TextureView(&slots.images[2].view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 4,
                            resource: wgpu::BindingResource::TextureView(&slots.images[3].view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 5,
                            resource: wgpu::BindingResource::TextureView(&slots.environment.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 6,
                            resource: wgpu::BindingResource::Sampler(&slots.images[0].sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 7,
                            resource: wgpu::BindingResource::Sampler(&slots.environment.sampler),
                        },
                    ],
                    label: Some(&material.name),
                });
                GpuMaterial { buffer, bind_group }
            })
            .collect();

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: UniformLayout::frame().size() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as usize;
        let object_stride = UniformLayout::object().size().next_multiple_of(alignment);
        let (object_buffer, object_bind_group) = mk_object_buffer(device, &object_layout, object_stride * 64);

        log::info!(
            "GPU scene ready: {} pipelines, {} meshes, {} textures, {} materials",
            assets.shaders().count(),
            assets.meshes().count(),
            textures.len(),
            assets.materials().count()
        );

        Self {
            pipelines,
            meshes,
            textures,
            materials,
            frame_buffer,
            frame_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_stride,
            frame_staging: None,
            object_staging: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Re-upload every material block. Program level values (lighting) may
    /// have changed since the last frame.
    pub fn sync_materials(&self, queue: &wgpu::Queue, assets: &Assets) {
        for ((_, material), gpu) in assets.materials().zip(&self.materials) {
            let block = material.resolve(assets.shader(material.shader));
            queue.write_buffer(&gpu.buffer, 0, block.bytes());
        }
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Upload this frame's uniforms and replay the recorded commands into `pass`.
    pub fn encode(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>) {
        if let Some(frame) = self.frame_staging.take() {
            queue.write_buffer(&self.frame_buffer, 0, frame.bytes());
        }
        if self.object_staging.len() as wgpu::BufferAddress > self.object_buffer.size() {
            let capacity = self.object_staging.len().next_power_of_two();
            log::debug!("Growing object uniform buffer to {capacity} bytes");
            let (buffer, bind_group) = mk_object_buffer(device, &self.object_layout, capacity);
            self.object_buffer = buffer;
            self.object_bind_group = bind_group;
        }
        if !self.object_staging.is_empty() {
            queue.write_buffer(&self.object_buffer, 0, &self.object_staging);
        }

        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for command in self.commands.drain(..) {
            match command {
                DrawCommand::Pipeline(shader) => pass.set_pipeline(&self.pipelines[shader.index()]),
                DrawCommand::Material(material) => {
                    pass.set_bind_group(1, &self.materials[material.index()].bind_group, &[]);
                }
                DrawCommand::Mesh { mesh, offset } => {
                    let mesh = &self.meshes[mesh.index()];
                    pass.set_bind_group(2, &self.object_bind_group, &[offset]);
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }
        self.object_staging.clear();
    }
}

impl DrawBackend for GpuScene {
    fn bind_shader(&mut self, shader: ShaderId, frame: &FrameUniforms) {
        if self.frame_staging.is_none() {
            self.frame_staging = Some(frame.to_block());
        }
        self.commands.push(DrawCommand::Pipeline(shader));
    }

    fn apply_material(&mut self, material: MaterialId) {
        self.commands.push(DrawCommand::Material(material));
    }

    fn draw_mesh(&mut self, mesh: MeshId, object: &ObjectUniforms) {
        let offset = self.object_staging.len();
        self.object_staging.extend_from_slice(object.to_block().bytes());
        self.object_staging.resize(offset + self.object_stride, 0);
        self.commands.push(DrawCommand::Mesh {
            mesh,
            offset: offset as u32,
        });
    }
}

/// The textures bound to a material's slots, falling back to a white image or
/// a black cube when a slot is empty or holds the wrong kind of texture.
struct MaterialTextures<'a> {
    images: [&'a Texture; 4],
    environment: &'a Texture,
}

impl<'a> MaterialTextures<'a> {
    fn resolve(material: &Material, textures: &'a [Texture], image: &'a Texture, cube: &'a Texture) -> Self {
        let lookup = |slot: &str, want_cube: bool, fallback: &'a Texture| -> &'a Texture {
            match (material.get(slot), want_cube) {
                (Some(UniformValue::Texture(id)), false) | (Some(UniformValue::CubeMap(id)), true) => {
                    &textures[id.index()]
                }
                (None, _) => fallback,
                (Some(other), _) => {
                    log::warn!("Material {} binds {other:?} to {slot}, using a fallback.", material.name);
                    fallback
                }
            }
        };
        let [diffuse, diffuse2, specular, reflectivity, environment] = TEXTURE_SLOTS;
        Self {
            images: [
                lookup(diffuse, false, image),
                lookup(diffuse2, false, image),
                lookup(specular, false, image),
                lookup(reflectivity, false, image),
            ],
            environment: lookup(environment, true, cube),
        }
    }
}
