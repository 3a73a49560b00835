//! Parser for `.vtx` strip files.
//!
//! The strip file mirrors the descriptor's body part → model hierarchy and
//! adds, per model, one entry for every LOD. Each LOD holds meshes made of
//! strip groups; a strip group owns a local vertex array (each local vertex
//! points back at a vertex of the descriptor mesh), an index array and the
//! strips that draw sub-ranges of both.
//!
//! Every child offset is relative to the record that declares it. Unlike the
//! other two files, the strip file has no identifier in its header.

use std::ops::Range;

use rootcause::Report;
use tracing::{debug, trace};
use winnow::Parser;
use winnow::binary::{le_f32, le_i16, le_i32, le_u8, le_u16};

use crate::data::offset_view::{Located, OffsetView};
use crate::data::parser_utils::{Record, WResult, checked_count, parse_u8_array};
use crate::error::{AssetError, AssetResult, FileKind};

/// The only strip file version this parser understands.
pub const STRIP_FILE_VERSION: i32 = 7;

pub const HEADER_SIZE: usize = 0x24;
const BODY_PART_SIZE: usize = 0x08;
const MODEL_SIZE: usize = 0x08;
const MODEL_LOD_SIZE: usize = 0x0C;
const MESH_SIZE: usize = 0x09;
const STRIP_GROUP_SIZE: usize = 0x19;
const STRIP_SIZE: usize = 0x1B;
const VERTEX_SIZE: usize = 0x09;
const MATERIAL_REPLACEMENT_LIST_SIZE: usize = 0x08;
const MATERIAL_REPLACEMENT_SIZE: usize = 0x06;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StripHeader {
    pub version: i32,
    pub vertex_cache_size: i32,
    pub max_bones_per_strip: u16,
    pub max_bones_per_triangle: u16,
    pub max_bones_per_vertex: i32,
    pub checksum: i32,
    pub lod_count: i32,
    pub material_replacement_list_offset: i32,
    pub body_part_count: i32,
    pub body_part_offset: i32,
}

impl Record for StripHeader {
    const SIZE: usize = HEADER_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let version = le_i32.parse_next(input)?;
        let vertex_cache_size = le_i32.parse_next(input)?;
        let max_bones_per_strip = le_u16.parse_next(input)?;
        let max_bones_per_triangle = le_u16.parse_next(input)?;
        let max_bones_per_vertex = le_i32.parse_next(input)?;
        let checksum = le_i32.parse_next(input)?;
        let lod_count = le_i32.parse_next(input)?;
        let material_replacement_list_offset = le_i32.parse_next(input)?;
        let body_part_count = le_i32.parse_next(input)?;
        let body_part_offset = le_i32.parse_next(input)?;
        Ok(StripHeader {
            version,
            vertex_cache_size,
            max_bones_per_strip,
            max_bones_per_triangle,
            max_bones_per_vertex,
            checksum,
            lod_count,
            material_replacement_list_offset,
            body_part_count,
            body_part_offset,
        })
    }
}

/// A strip group's local vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StripVertex {
    pub bone_weight_indices: [u8; 3],
    pub bone_count: u8,
    /// Index of the vertex within the descriptor mesh this strip group belongs to.
    pub original_mesh_vertex_id: u16,
    pub bone_ids: [i8; 3],
}

impl Record for StripVertex {
    const SIZE: usize = VERTEX_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let bone_weight_indices = parse_u8_array::<3>(input)?;
        let bone_count = le_u8.parse_next(input)?;
        let original_mesh_vertex_id = le_u16.parse_next(input)?;
        let bone_ids = parse_u8_array::<3>(input)?.map(|id| id as i8);
        Ok(StripVertex {
            bone_weight_indices,
            bone_count,
            original_mesh_vertex_id,
            bone_ids,
        })
    }
}

/// A renderable primitive drawing a sub-range of its strip group's arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Strip {
    pub index_count: i32,
    pub index_offset: i32,
    pub vertex_count: i32,
    pub vertex_offset: i32,
    pub bone_count: i16,
    pub flags: u8,
    pub bone_state_change_count: i32,
}

impl Strip {
    /// Range of this strip within [`StripGroup::indices`], if it is non-negative.
    pub fn index_range(&self) -> Option<Range<usize>> {
        to_range(self.index_offset, self.index_count)
    }

    /// Range of this strip within [`StripGroup::vertices`], if it is non-negative.
    pub fn vertex_range(&self) -> Option<Range<usize>> {
        to_range(self.vertex_offset, self.vertex_count)
    }
}

fn to_range(offset: i32, count: i32) -> Option<Range<usize>> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(usize::try_from(count).ok()?)?;
    Some(start..end)
}

impl Record for Strip {
    const SIZE: usize = STRIP_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let index_count = le_i32.parse_next(input)?;
        let index_offset = le_i32.parse_next(input)?;
        let vertex_count = le_i32.parse_next(input)?;
        let vertex_offset = le_i32.parse_next(input)?;
        let bone_count = le_i16.parse_next(input)?;
        let flags = le_u8.parse_next(input)?;
        let bone_state_change_count = le_i32.parse_next(input)?;
        let _bone_state_change_offset = le_i32.parse_next(input)?;
        Ok(Strip {
            index_count,
            index_offset,
            vertex_count,
            vertex_offset,
            bone_count,
            flags,
            bone_state_change_count,
        })
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StripGroup {
    pub vertices: Vec<StripVertex>,
    pub indices: Vec<u16>,
    pub strips: Vec<Strip>,
    pub flags: u8,
}

impl StripGroup {
    /// The slice of [`Self::indices`] drawn by `strip`, or `None` if `strip`
    /// reaches outside this group.
    pub fn strip_indices(&self, strip: &Strip) -> Option<&[u16]> {
        self.indices.get(strip.index_range()?)
    }

    /// The slice of [`Self::vertices`] used by `strip`, or `None` if `strip`
    /// reaches outside this group.
    pub fn strip_vertices(&self, strip: &Strip) -> Option<&[StripVertex]> {
        self.vertices.get(strip.vertex_range()?)
    }
}

struct StripGroupFields {
    vertex_count: i32,
    vertex_offset: i32,
    index_count: i32,
    index_offset: i32,
    strip_count: i32,
    strip_offset: i32,
    flags: u8,
}

impl Record for StripGroupFields {
    const SIZE: usize = STRIP_GROUP_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let vertex_count = le_i32.parse_next(input)?;
        let vertex_offset = le_i32.parse_next(input)?;
        let index_count = le_i32.parse_next(input)?;
        let index_offset = le_i32.parse_next(input)?;
        let strip_count = le_i32.parse_next(input)?;
        let strip_offset = le_i32.parse_next(input)?;
        let flags = le_u8.parse_next(input)?;
        Ok(StripGroupFields {
            vertex_count,
            vertex_offset,
            index_count,
            index_offset,
            strip_count,
            strip_offset,
            flags,
        })
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mesh {
    pub strip_groups: Vec<StripGroup>,
    pub flags: u8,
}

struct MeshFields {
    strip_group_count: i32,
    strip_group_offset: i32,
    flags: u8,
}

impl Record for MeshFields {
    const SIZE: usize = MESH_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let strip_group_count = le_i32.parse_next(input)?;
        let strip_group_offset = le_i32.parse_next(input)?;
        let flags = le_u8.parse_next(input)?;
        Ok(MeshFields {
            strip_group_count,
            strip_group_offset,
            flags,
        })
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModelLod {
    pub meshes: Vec<Mesh>,
    /// Distance threshold at which this LOD takes over.
    pub switch_point: f32,
}

struct ModelLodFields {
    mesh_count: i32,
    mesh_offset: i32,
    switch_point: f32,
}

impl Record for ModelLodFields {
    const SIZE: usize = MODEL_LOD_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let mesh_count = le_i32.parse_next(input)?;
        let mesh_offset = le_i32.parse_next(input)?;
        let switch_point = le_f32.parse_next(input)?;
        Ok(ModelLodFields {
            mesh_count,
            mesh_offset,
            switch_point,
        })
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Model {
    pub lods: Vec<ModelLod>,
}

struct ModelFields {
    lod_count: i32,
    lod_offset: i32,
}

impl Record for ModelFields {
    const SIZE: usize = MODEL_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let lod_count = le_i32.parse_next(input)?;
        let lod_offset = le_i32.parse_next(input)?;
        Ok(ModelFields {
            lod_count,
            lod_offset,
        })
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BodyPart {
    pub models: Vec<Model>,
}

struct BodyPartFields {
    model_count: i32,
    model_offset: i32,
}

impl Record for BodyPartFields {
    const SIZE: usize = BODY_PART_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let model_count = le_i32.parse_next(input)?;
        let model_offset = le_i32.parse_next(input)?;
        Ok(BodyPartFields {
            model_count,
            model_offset,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MaterialReplacement {
    pub material_id: i16,
    pub name: String,
}

struct MaterialReplacementFields {
    material_id: i16,
    name_offset: i32,
}

impl Record for MaterialReplacementFields {
    const SIZE: usize = MATERIAL_REPLACEMENT_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let material_id = le_i16.parse_next(input)?;
        let name_offset = le_i32.parse_next(input)?;
        Ok(MaterialReplacementFields {
            material_id,
            name_offset,
        })
    }
}

struct MaterialReplacementListFields {
    replacement_count: i32,
    replacement_offset: i32,
}

impl Record for MaterialReplacementListFields {
    const SIZE: usize = MATERIAL_REPLACEMENT_LIST_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let replacement_count = le_i32.parse_next(input)?;
        let replacement_offset = le_i32.parse_next(input)?;
        Ok(MaterialReplacementListFields {
            replacement_count,
            replacement_offset,
        })
    }
}

/// A fully decoded strip file.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StripFile {
    header: StripHeader,
    body_parts: Vec<BodyPart>,
    material_replacements: Vec<Vec<MaterialReplacement>>,
}

impl StripFile {
    /// Parse a strip file belonging to a model with checksum `expected_checksum`
    /// whose vertex file declares `expected_lod_count` LODs.
    pub fn parse(
        data: &[u8],
        expected_checksum: i32,
        expected_lod_count: i32,
    ) -> AssetResult<StripFile> {
        let view = OffsetView::new(data);
        let header = view.parse_record::<StripHeader>(0)?;

        if header.version != STRIP_FILE_VERSION {
            return Err(Report::new(AssetError::UnsupportedVersion {
                file: FileKind::Strip,
                version: header.version,
                supported: STRIP_FILE_VERSION,
            }));
        }
        if header.checksum != expected_checksum {
            return Err(Report::new(AssetError::InvalidChecksum {
                file: FileKind::Strip,
                field: "checksum",
                expected: expected_checksum,
                found: header.checksum,
            }));
        }
        if header.lod_count != expected_lod_count {
            return Err(Report::new(AssetError::InvalidChecksum {
                file: FileKind::Strip,
                field: "LOD count",
                expected: expected_lod_count,
                found: header.lod_count,
            }));
        }

        debug!(
            checksum = header.checksum,
            lods = header.lod_count,
            body_parts = header.body_part_count,
            "parsed strip file header"
        );

        let body_part_count = checked_count(FileKind::Strip, "body part", header.body_part_count)?;
        let body_parts = view
            .parse_located_array::<BodyPartFields>(header.body_part_offset, body_part_count)?
            .into_iter()
            .map(|located| parse_body_part(located, header.lod_count))
            .collect::<AssetResult<Vec<_>>>()?;

        let material_replacements = parse_material_replacements(&view, &header)?;

        Ok(StripFile {
            header,
            body_parts,
            material_replacements,
        })
    }

    pub fn header(&self) -> &StripHeader {
        &self.header
    }

    pub fn checksum(&self) -> i32 {
        self.header.checksum
    }

    pub fn lod_count(&self) -> i32 {
        self.header.lod_count
    }

    pub fn body_parts(&self) -> &[BodyPart] {
        &self.body_parts
    }

    /// Material replacements declared for `lod`.
    pub fn material_replacements(&self, lod: usize) -> AssetResult<&[MaterialReplacement]> {
        self.material_replacements
            .get(lod)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                Report::new(AssetError::out_of_bounds(
                    lod as i64,
                    1,
                    self.material_replacements.len(),
                ))
            })
    }

    /// Material replacement lists for every LOD, in LOD order.
    pub fn material_replacement_lists(&self) -> &[Vec<MaterialReplacement>] {
        &self.material_replacements
    }
}

fn parse_body_part(
    Located { record, view }: Located<'_, BodyPartFields>,
    expected_lods: i32,
) -> AssetResult<BodyPart> {
    let model_count = checked_count(FileKind::Strip, "model", record.model_count)?;
    let models = view
        .parse_located_array::<ModelFields>(record.model_offset, model_count)?
        .into_iter()
        .map(|located| {
            if located.record.lod_count != expected_lods {
                return Err(Report::new(AssetError::invalid_body(
                    FileKind::Strip,
                    format!(
                        "model declares {} LODs but the header declares {expected_lods}",
                        located.record.lod_count
                    ),
                )));
            }
            parse_model(located)
        })
        .collect::<AssetResult<Vec<_>>>()?;
    Ok(BodyPart { models })
}

fn parse_model(Located { record, view }: Located<'_, ModelFields>) -> AssetResult<Model> {
    let lod_count = checked_count(FileKind::Strip, "LOD", record.lod_count)?;
    let lods = view
        .parse_located_array::<ModelLodFields>(record.lod_offset, lod_count)?
        .into_iter()
        .map(parse_model_lod)
        .collect::<AssetResult<Vec<_>>>()?;
    Ok(Model { lods })
}

fn parse_model_lod(Located { record, view }: Located<'_, ModelLodFields>) -> AssetResult<ModelLod> {
    let mesh_count = checked_count(FileKind::Strip, "mesh", record.mesh_count)?;
    let meshes = view
        .parse_located_array::<MeshFields>(record.mesh_offset, mesh_count)?
        .into_iter()
        .map(parse_mesh)
        .collect::<AssetResult<Vec<_>>>()?;
    Ok(ModelLod {
        meshes,
        switch_point: record.switch_point,
    })
}

fn parse_mesh(Located { record, view }: Located<'_, MeshFields>) -> AssetResult<Mesh> {
    let strip_group_count =
        checked_count(FileKind::Strip, "strip group", record.strip_group_count)?;
    let strip_groups = view
        .parse_located_array::<StripGroupFields>(record.strip_group_offset, strip_group_count)?
        .into_iter()
        .map(parse_strip_group)
        .collect::<AssetResult<Vec<_>>>()?;
    Ok(Mesh {
        strip_groups,
        flags: record.flags,
    })
}

fn parse_strip_group(
    Located { record, view }: Located<'_, StripGroupFields>,
) -> AssetResult<StripGroup> {
    let vertex_count = checked_count(FileKind::Strip, "strip group vertex", record.vertex_count)?;
    let index_count = checked_count(FileKind::Strip, "strip group index", record.index_count)?;
    let strip_count = checked_count(FileKind::Strip, "strip", record.strip_count)?;

    let vertices = view.parse_array::<StripVertex>(record.vertex_offset, vertex_count)?;
    let indices = view.parse_array::<u16>(record.index_offset, index_count)?;
    let strips = view.parse_array::<Strip>(record.strip_offset, strip_count)?;

    for strip in &strips {
        check_range(strip.vertex_offset, strip.vertex_count, vertices.len())?;
        check_range(strip.index_offset, strip.index_count, indices.len())?;
    }

    trace!(
        vertices = vertices.len(),
        indices = indices.len(),
        strips = strips.len(),
        "parsed strip group"
    );

    Ok(StripGroup {
        vertices,
        indices,
        strips,
        flags: record.flags,
    })
}

/// Check that `offset..offset + count` lies within an array of `len` elements.
fn check_range(offset: i32, count: i32, len: usize) -> AssetResult<()> {
    let end = i64::from(offset) + i64::from(count);
    if offset < 0 || count < 0 || end > len as i64 {
        return Err(Report::new(AssetError::out_of_bounds(
            i64::from(offset),
            count.max(0) as usize,
            len,
        )));
    }
    Ok(())
}

fn parse_material_replacements(
    view: &OffsetView<'_>,
    header: &StripHeader,
) -> AssetResult<Vec<Vec<MaterialReplacement>>> {
    let lod_count = checked_count(FileKind::Strip, "LOD", header.lod_count)?;
    view.parse_located_array::<MaterialReplacementListFields>(
        header.material_replacement_list_offset,
        lod_count,
    )?
    .into_iter()
    .map(|Located { record, view }| {
        let count = checked_count(
            FileKind::Strip,
            "material replacement",
            record.replacement_count,
        )?;
        view.parse_located_array::<MaterialReplacementFields>(record.replacement_offset, count)?
            .into_iter()
            .map(|Located { record, view }| {
                Ok(MaterialReplacement {
                    material_id: record.material_id,
                    name: view.parse_string(record.name_offset)?,
                })
            })
            .collect()
    })
    .collect()
}
