use super::data::Vertex;

use glam::{Vec2, Vec3};
use std::f32::consts::PI;

#[derive(Clone, Debug)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn num_indices(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// UV sphere centred at the origin.
///
/// `u` runs along longitude starting at -180 (the -X axis), `v` runs from the
/// north pole (+Y) to the south pole, matching image row order. Faces are
/// counter-clockwise when seen from outside.
pub fn generate_uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let row_len = width_segments + 1;

    let vertices = (0..=height_segments)
        .flat_map(|iy| {
            let v = iy as f32 / height_segments as f32;
            (0..=width_segments).map(move |ix| {
                let u = ix as f32 / width_segments as f32;
                let (sin_v, cos_v) = (v * PI).sin_cos();
                let (sin_u, cos_u) = (u * 2.0 * PI).sin_cos();
                let normal = Vec3::new(-cos_u * sin_v, cos_v, sin_u * sin_v);
                Vertex::new(normal * radius, normal, Vec2::new(u, v))
            })
        })
        .collect();

    let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row_len + ix + 1;
            let b = iy * row_len + ix;
            let c = (iy + 1) * row_len + ix;
            let d = (iy + 1) * row_len + ix + 1;

            // the pole rows collapse to triangles
            if iy != 0 {
                indices.extend([a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend([b, c, d]);
            }
        }
    }

    Geometry { vertices, indices }
}
