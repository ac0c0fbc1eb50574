use std::{collections::BTreeMap, ops::Range, sync::Arc};

use color_eyre::Result;
use itertools::Itertools;
use winit::window::Window;

use crate::{
    common::data::Size,
    control::render_loop::FrameRenderer,
    error::DrawError,
    scene::{
        assets::SceneAssets,
        graph::{DrawItem, OutputSurface, SceneGraph},
        material::{GeometryId, MaterialId, Side, TextureSlot},
    },
};

use super::{
    buffer::Buffer,
    data::{FrameUniforms, InstanceRaw, MaterialUniforms},
    pipeline::{texture_binding, Pipeline, SAMPLER_BINDING},
    texture::Texture,
};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Consecutive instances sharing geometry and material.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub side: Side,
    pub instances: Range<u32>,
}

/// Groups draw items into instanced batches, keeping the order in which each
/// (geometry, material) pair first appears.
pub fn build_batches(items: &[DrawItem]) -> (Vec<InstanceRaw>, Vec<Batch>) {
    let mut instances = Vec::with_capacity(items.len());
    let mut batches = Vec::new();

    let first_seen = items
        .iter()
        .enumerate()
        .map(|(i, item)| ((item.geometry, item.material), i))
        .rev()
        .collect::<BTreeMap<_, _>>();

    for (key, chunk) in &items
        .iter()
        .sorted_by_key(|item| first_seen[&(item.geometry, item.material)])
        .chunk_by(|item| (item.geometry, item.material))
    {
        let start = instances.len() as u32;
        let mut side = Side::Front;
        for item in chunk {
            side = item.side;
            instances.push(InstanceRaw::new(item.world));
        }
        batches.push(Batch {
            geometry: key.0,
            material: key.1,
            side,
            instances: start..instances.len() as u32,
        });
    }

    (instances, batches)
}

struct GpuGeometry {
    vertices: Buffer,
    indices: Buffer,
    num_indices: u32,
}

struct GpuMaterial {
    _uniforms: wgpu::Buffer,
    _textures: Vec<Texture>,
    bind_group: wgpu::BindGroup,
}

/// Owns the wgpu device and surface and draws a [`SceneGraph`].
pub struct RenderEngine {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: Size<u32>,
    pipeline: Pipeline,
    depth_texture: Texture,
    placeholder: Texture,
    sampler: wgpu::Sampler,
    instances: Buffer,
    geometries: BTreeMap<GeometryId, GpuGeometry>,
    materials: BTreeMap<MaterialId, GpuMaterial>,
}

impl RenderEngine {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size: Size<u32> = window.inner_size().into();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);

        let format = {
            let mut format = surface_caps.formats[0];
            let format_srgb = format.add_srgb_suffix();
            if surface_caps.formats.contains(&format_srgb) {
                format = format_srgb;
            }
            format
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![format],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Render engine ready: {:?}, {format:?}, {}x{}",
            adapter.get_info().backend,
            config.width,
            config.height
        );

        let pipeline = Pipeline::create_mesh_pipeline(&device, format);
        let depth_texture =
            Texture::create_depth_texture(&device, (config.width, config.height), "depth_texture");
        let placeholder = Texture::create_placeholder(&device, &queue);
        let sampler = Texture::create_sampler(&device);
        let instances = Buffer::new(
            &device,
            "instance buffer",
            (std::mem::size_of::<InstanceRaw>() * 64) as u64,
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            pipeline,
            depth_texture,
            placeholder,
            sampler,
            instances,
            geometries: BTreeMap::new(),
            materials: BTreeMap::new(),
        })
    }

    pub fn size(&self) -> Size<u32> {
        self.size
    }

    /// Reconfigures the surface at its current size, after it was lost or
    /// became outdated.
    pub fn reconfigure(&mut self) {
        self.resize_output(self.size);
    }

    fn upload_geometry(&mut self, id: GeometryId, assets: &SceneAssets) {
        if self.geometries.contains_key(&id) {
            return;
        }
        let geometry = assets.geometry(id);
        let gpu_geometry = GpuGeometry {
            vertices: Buffer::new_init(
                &self.device,
                "vertex buffer",
                bytemuck::cast_slice(&geometry.vertices),
                wgpu::BufferUsages::VERTEX,
            ),
            indices: Buffer::new_init(
                &self.device,
                "index buffer",
                bytemuck::cast_slice(&geometry.indices),
                wgpu::BufferUsages::INDEX,
            ),
            num_indices: geometry.num_indices(),
        };
        log::debug!(
            "Uploaded geometry {id:?}: {} bytes of vertices",
            gpu_geometry.vertices.size()
        );
        self.geometries.insert(id, gpu_geometry);
    }

    fn upload_material(&mut self, id: MaterialId, assets: &SceneAssets) {
        let material = assets.material(id);
        let uniforms = Buffer::new_init(
            &self.device,
            "material uniform buffer",
            bytemuck::bytes_of(&MaterialUniforms::new(material)),
            wgpu::BufferUsages::UNIFORM,
        )
        .raw;

        let slots = [
            TextureSlot::Map,
            TextureSlot::EmissiveMap,
            TextureSlot::SpecularMap,
        ];
        let textures = slots
            .iter()
            .filter_map(|&slot| {
                material.texture(slot).map(|image| {
                    (
                        slot,
                        Texture::from_image(&self.device, &self.queue, image, "material_texture"),
                    )
                })
            })
            .collect::<BTreeMap<_, _>>();

        let views = slots.map(|slot| {
            textures
                .get(&slot)
                .unwrap_or(&self.placeholder)
                .get_view()
                .clone()
        });

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            },
        ];
        entries.extend(slots.iter().zip(&views).map(|(&slot, view)| {
            wgpu::BindGroupEntry {
                binding: texture_binding(slot),
                resource: wgpu::BindingResource::TextureView(view),
            }
        }));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material bind group"),
            layout: self.pipeline.get_material_bind_group_layout(),
            entries: &entries,
        });

        log::debug!("Uploaded material {id:?} with {} textures", textures.len());
        self.materials.insert(
            id,
            GpuMaterial {
                _uniforms: uniforms,
                _textures: textures.into_values().collect(),
                bind_group,
            },
        );
    }

    pub fn render(&mut self, scene: &mut SceneGraph) -> std::result::Result<(), wgpu::SurfaceError> {
        for id in scene.assets_mut().take_updated_materials() {
            self.upload_material(id, scene.assets());
        }

        let items = scene.draw_list();
        items
            .iter()
            .for_each(|item| self.upload_geometry(item.geometry, scene.assets()));

        let (instances, batches) = build_batches(&items);
        self.instances
            .write(&self.device, &self.queue, bytemuck::cast_slice(&instances));
        self.queue.write_buffer(
            self.pipeline.get_uniforms(),
            0,
            bytemuck::bytes_of(&FrameUniforms::new(&scene.camera, &scene.light)),
        );

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.config.format),
            ..Default::default()
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render.pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_texture.get_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, self.pipeline.get_uniform_bind_group(), &[]);
            render_pass.set_vertex_buffer(1, self.instances.raw.slice(..));

            for batch in &batches {
                let (Some(geometry), Some(material)) = (
                    self.geometries.get(&batch.geometry),
                    self.materials.get(&batch.material),
                ) else {
                    log::warn!("Skipping batch without GPU resources: {batch:?}");
                    continue;
                };

                render_pass.set_pipeline(self.pipeline.get_pipeline(batch.side));
                render_pass.set_bind_group(1, &material.bind_group, &[]);
                render_pass.set_vertex_buffer(0, geometry.vertices.raw.slice(..));
                render_pass
                    .set_index_buffer(geometry.indices.raw.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..geometry.num_indices, 0, batch.instances.clone());
            }
        }

        self.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        output.present();

        Ok(())
    }
}

impl FrameRenderer for RenderEngine {
    fn draw(&mut self, scene: &mut SceneGraph) -> std::result::Result<(), DrawError> {
        Ok(self.render(scene)?)
    }
}

impl OutputSurface for RenderEngine {
    fn resize_output(&mut self, size: Size<u32>) {
        if size.is_empty() {
            return;
        }
        self.size = size;
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, (size.width, size.height), "depth_texture");
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec3, Mat4};

    use super::*;

    fn item(geometry: usize, material: usize, x: f32) -> DrawItem {
        DrawItem {
            geometry: GeometryId(geometry),
            material: MaterialId(material),
            side: if material == 0 { Side::Back } else { Side::Front },
            world: Mat4::from_translation(vec3(x, 0.0, 0.0)),
        }
    }

    #[test]
    fn shared_assets_collapse_into_one_batch() {
        let items = [
            item(0, 0, 0.0),
            item(1, 1, 1.0),
            item(2, 2, 2.0),
            item(1, 1, 3.0),
            item(2, 2, 4.0),
            item(2, 2, 5.0),
        ];

        let (instances, batches) = build_batches(&items);

        assert_eq!(instances.len(), items.len());
        assert_eq!(
            batches,
            vec![
                Batch {
                    geometry: GeometryId(0),
                    material: MaterialId(0),
                    side: Side::Back,
                    instances: 0..1,
                },
                Batch {
                    geometry: GeometryId(1),
                    material: MaterialId(1),
                    side: Side::Front,
                    instances: 1..3,
                },
                Batch {
                    geometry: GeometryId(2),
                    material: MaterialId(2),
                    side: Side::Front,
                    instances: 3..6,
                },
            ]
        );
    }

    #[test]
    fn instances_follow_batch_order() {
        let items = [item(1, 1, 1.0), item(2, 2, 2.0), item(1, 1, 3.0)];

        let (instances, _) = build_batches(&items);

        let xs = instances
            .iter()
            .map(|instance| instance.model().w_axis.x)
            .collect::<Vec<_>>();
        assert_eq!(xs, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn empty_scene_has_no_batches() {
        let (instances, batches) = build_batches(&[]);
        assert!(instances.is_empty());
        assert!(batches.is_empty());
    }
}
