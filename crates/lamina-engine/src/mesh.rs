//! Static indexed mesh with position + normal vertices.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::shader::VertexAttribute;

/// Interleaved vertex: position then normal, six floats.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// location 0 = position, location 1 = normal (offset 3 floats).
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub const STRIDE: u64 = size_of::<Vertex>() as u64;

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// The attribute set the link step checks vertex shaders against.
    pub fn attributes() -> [VertexAttribute; 2] {
        [VertexAttribute::new(0, 3), VertexAttribute::new(1, 3)]
    }
}

const UP: [f32; 3] = [0.0, 0.0, 1.0];

/// Unit quad in the z = 0 plane facing +Z.
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex { position: [-0.5, -0.5, 0.0], normal: UP },
    Vertex { position: [0.5, -0.5, 0.0], normal: UP },
    Vertex { position: [0.5, 0.5, 0.0], normal: UP },
    Vertex { position: [-0.5, 0.5, 0.0], normal: UP },
];

/// Two counter-clockwise triangles.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Vertex + index buffers uploaded once. There is no update path.
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn upload(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        debug_assert!(
            indices.iter().all(|&i| (i as usize) < vertices.len()),
            "mesh index out of range"
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lamina mesh vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lamina mesh indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!("uploaded mesh: {} vertices, {} indices", vertices.len(), indices.len());

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds both buffers and draws every index as a triangle list.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_has_two_triangles_over_four_vertices() {
        assert_eq!(QUAD_INDICES.len(), 6);
        assert_eq!(QUAD_INDICES.len() / 3, 2);
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < QUAD_VERTICES.len()));
    }

    #[test]
    fn layout_is_six_floats_with_normal_after_position() {
        assert_eq!(Vertex::STRIDE, 6 * 4);
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].shader_location, 1);
        assert_eq!(layout.attributes[1].offset, 3 * 4);
    }

    #[test]
    fn link_attributes_match_wgpu_layout() {
        let from_layout: Vec<VertexAttribute> = Vertex::ATTRIBUTES
            .iter()
            .filter_map(VertexAttribute::from_wgpu)
            .collect();
        assert_eq!(from_layout, Vertex::attributes());
    }

    #[test]
    fn quad_faces_positive_z() {
        for v in &QUAD_VERTICES {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert_eq!(v.position[2], 0.0);
        }
        // Vertex data is packed without padding.
        assert_eq!(bytemuck::cast_slice::<Vertex, f32>(&QUAD_VERTICES).len(), 24);
    }
}
