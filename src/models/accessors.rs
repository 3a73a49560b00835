//! Pairwise walks over the descriptor and strip hierarchies.
//!
//! The model file and the strip file describe the same body parts, models
//! and meshes in the same order. Nothing links the two trees other than that
//! order, so they are walked side by side and must have equal lengths at
//! every level.

use std::iter::Zip;
use std::slice::Iter;

use rootcause::Report;

use crate::error::{AssetError, AssetResult};
use crate::models::mdl::{self, ModelFile};
use crate::models::vtx::{self, StripFile, StripVertex};
use crate::models::vvd::{Tangent, Vertex, VertexFile};

fn zip_exact<'l, 'r, L, R>(
    what: &'static str,
    left: &'l [L],
    right: &'r [R],
) -> AssetResult<Zip<Iter<'l, L>, Iter<'r, R>>> {
    if left.len() != right.len() {
        return Err(Report::new(AssetError::LengthMismatch {
            what,
            left: left.len(),
            right: right.len(),
        }));
    }
    Ok(left.iter().zip(right.iter()))
}

/// Call `f` with each descriptor body part and its strip counterpart.
pub fn for_each_body_part<F>(model: &ModelFile, strip: &StripFile, mut f: F) -> AssetResult<()>
where
    F: FnMut(&mdl::BodyPart, &vtx::BodyPart) -> AssetResult<()>,
{
    for (descriptor, strip) in zip_exact("body parts", model.body_parts(), strip.body_parts())? {
        f(descriptor, strip)?;
    }
    Ok(())
}

/// Call `f` with each model of a body part and its strip counterpart.
pub fn for_each_model<F>(
    descriptor: &mdl::BodyPart,
    strip: &vtx::BodyPart,
    mut f: F,
) -> AssetResult<()>
where
    F: FnMut(&mdl::Model, &vtx::Model) -> AssetResult<()>,
{
    for (descriptor, strip) in zip_exact("models", &descriptor.models, &strip.models)? {
        f(descriptor, strip)?;
    }
    Ok(())
}

/// Call `f` with each mesh of a model and its counterpart in one strip LOD.
pub fn for_each_mesh<F>(descriptor: &mdl::Model, lod: &vtx::ModelLod, mut f: F) -> AssetResult<()>
where
    F: FnMut(&mdl::Mesh, &vtx::Mesh) -> AssetResult<()>,
{
    for (descriptor, strip) in zip_exact("meshes", &descriptor.meshes, &lod.meshes)? {
        f(descriptor, strip)?;
    }
    Ok(())
}

/// Call `f` with every local vertex of `group` and the vertex and tangent it
/// refers to.
///
/// A local vertex addresses the reconstructed arrays at
/// `model.vertex_offset + mesh.vertex_offset + original_mesh_vertex_id`
/// (tangents use `model.tangent_offset`).
pub fn for_each_vertex<F>(
    vertices: &VertexFile,
    model: &mdl::Model,
    mesh: &mdl::Mesh,
    group: &vtx::StripGroup,
    mut f: F,
) -> AssetResult<()>
where
    F: FnMut(&StripVertex, &Vertex, &Tangent) -> AssetResult<()>,
{
    let vertex_base = i64::from(model.vertex_offset) + i64::from(mesh.vertex_offset);
    let tangent_base = i64::from(model.tangent_offset) + i64::from(mesh.vertex_offset);

    for local in &group.vertices {
        let id = i64::from(local.original_mesh_vertex_id);
        let vertex = vertices.vertex(vertex_base + id)?;
        let tangent = vertices.tangent(tangent_base + id)?;
        f(local, vertex, tangent)?;
    }
    Ok(())
}
