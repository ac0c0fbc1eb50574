use glam::{Mat4, Vec2, Vec3};

use crate::scene::{
    camera::PerspectiveCamera,
    graph::PointLight,
    material::{Material, Shading},
};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        // position
        0 => Float32x3,
        // normal
        1 => Float32x3,
        // uv
        2 => Float32x2
    ];

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Per-mesh world transform, fed as an instance buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
}

impl InstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4
    ];

    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    light_position: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

impl FrameUniforms {
    pub fn new(camera: &PerspectiveCamera, light: &PointLight) -> Self {
        let light_color = light.color.to_vec3() * light.intensity;
        Self {
            view_proj: camera.build_view_proj_matrix().to_cols_array_2d(),
            camera_position: camera.position().extend(1.0).to_array(),
            light_position: light.position.extend(1.0).to_array(),
            light_color: light_color.extend(1.0).to_array(),
            ambient: light.ambient.to_vec3().extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    color: [f32; 4],
    emissive: [f32; 4],
    specular: [f32; 4],
    // x: shininess, y: shading model
    params: [f32; 4],
}

impl MaterialUniforms {
    pub fn new(material: &Material) -> Self {
        let shading = match material.shading {
            Shading::Basic => 0.0,
            Shading::Lambert => 1.0,
            Shading::Phong => 2.0,
        };
        let emissive = material.emissive.to_vec3() * material.emissive_intensity;
        Self {
            color: material.color.to_vec3().extend(1.0).to_array(),
            emissive: emissive.extend(1.0).to_array(),
            specular: material.specular.to_vec3().extend(1.0).to_array(),
            params: [material.shininess, shading, 0.0, 0.0],
        }
    }
}
