/// Mesh assembly from storage buffers, and built-in geometry

use glam::{Vec2, Vec3};

use crate::error::Result;
use crate::gfx::{BufferDesc, BufferType, BufferUsage, Pipeline, PipelineDesc};
use crate::resource::{BufferId, Mesh, MeshType, ResourceStorage, VertexType};
use crate::{engine_bail, engine_debug};

/// Corner offsets of a face in (u, v) and their texture coordinates
const FACE_CORNERS: [(f32, f32); 4] = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];
const FACE_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Cube faces as (normal, u, v) with `u x v == normal`
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

/// Build a mesh over buffers already in `storage`
pub(crate) fn load(
    storage: &ResourceStorage,
    vertex_buffer: BufferId,
    vertex_type: VertexType,
    index_buffer: Option<BufferId>,
    indices_count: usize,
) -> Result<Mesh> {
    let Some(vertices) = storage.get_buffer(vertex_buffer).cloned() else {
        engine_bail!("ember3d::MeshLoader", "Mesh vertex buffer is not in storage '{}'", storage.name());
    };
    let indices = match index_buffer {
        Some(id) => match storage.get_buffer(id) {
            Some(buffer) => Some(buffer.clone()),
            None => engine_bail!("ember3d::MeshLoader",
                "Mesh index buffer is not in storage '{}'", storage.name()),
        },
        None => None,
    };

    let desc = PipelineDesc {
        vertices_count: vertices.size() / vertex_type.stride(),
        vertex_buffer: Some(vertices),
        index_buffer: indices,
        indices_count,
        layout: vertex_type.layout(),
        ..PipelineDesc::default()
    };
    let pipeline = Pipeline::create(storage.context(), &desc)?;

    Ok(Mesh {
        vertex_buffer,
        index_buffer,
        vertex_type,
        pipeline,
        pipeline_desc: desc,
        storage: storage.name().to_string(),
    })
}

/// Push the geometry buffers of a built-in shape, then build the mesh
pub(crate) fn load_type(storage: &mut ResourceStorage, mesh_type: MeshType) -> Result<Mesh> {
    let (vertices, indices) = match mesh_type {
        MeshType::Cube => cube_geometry(),
        MeshType::Plane => plane_geometry(),
    };
    engine_debug!("ember3d::MeshLoader", "Generating {:?} ({} vertices, {} indices)",
        mesh_type, vertices.len() / VertexType::Pos3Normal3Uv2.components(), indices.len());

    let vertex_buffer = storage.push_buffer(&BufferDesc::with_data(
        BufferType::Vertex,
        BufferUsage::StaticDraw,
        bytemuck::cast_slice(&vertices).to_vec(),
    ))?;
    let index_buffer = storage.push_buffer(&BufferDesc::with_data(
        BufferType::Index,
        BufferUsage::StaticDraw,
        bytemuck::cast_slice(&indices).to_vec(),
    ))?;

    load(storage, vertex_buffer, VertexType::Pos3Normal3Uv2, Some(index_buffer), indices.len())
}

// ===== GEOMETRY =====

/// Append one quad lying `distance` along `normal`
fn push_face(vertices: &mut Vec<f32>, indices: &mut Vec<u32>, face: (Vec3, Vec3, Vec3), distance: f32) {
    let (normal, u, v) = face;
    let base = (vertices.len() / VertexType::Pos3Normal3Uv2.components()) as u32;
    for (du, dv) in FACE_CORNERS {
        let position = normal * distance + u * du + v * dv;
        let uv = Vec2::new(du + 0.5, dv + 0.5);
        vertices.extend_from_slice(&position.to_array());
        vertices.extend_from_slice(&normal.to_array());
        vertices.extend_from_slice(&uv.to_array());
    }
    indices.extend(FACE_INDICES.iter().map(|index| base + index));
}

/// Unit cube, position/normal/uv, 24 vertices and 36 indices
pub(crate) fn cube_geometry() -> (Vec<f32>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for face in CUBE_FACES {
        push_face(&mut vertices, &mut indices, face, 0.5);
    }
    (vertices, indices)
}

/// Unit quad at y = 0 facing +Y, 4 vertices and 6 indices
pub(crate) fn plane_geometry() -> (Vec<f32>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    push_face(&mut vertices, &mut indices, (Vec3::Y, Vec3::Z, Vec3::X), 0.0);
    (vertices, indices)
}

/// Positions of a unit cube seen from the inside, 36 vertices
pub(crate) fn cube_positions_inward() -> Vec<f32> {
    let (vertices, indices) = cube_geometry();
    let stride = VertexType::Pos3Normal3Uv2.components();
    indices
        .chunks(3)
        .flat_map(|triangle| [triangle[0], triangle[2], triangle[1]])
        .flat_map(|index| {
            let start = index as usize * stride;
            vertices[start..start + 3].to_vec()
        })
        .collect()
}

#[cfg(test)]
#[path = "mesh_loader_tests.rs"]
mod tests;
