//! Parser for `.vvd` vertex files.
//!
//! A vertex file stores every vertex of every LOD in one flat array, with a
//! parallel tangent array. When LODs share vertices the compiler writes a
//! fixup table describing which runs of the on-disk array belong to which
//! LOD; walking it for a given root LOD produces the array that the model
//! descriptor's vertex offsets index into.

use rootcause::Report;
use tracing::{debug, trace, warn};
use winnow::Parser;
use winnow::binary::{le_f32, le_i8, le_i32, le_u8, le_u32};

use crate::data::offset_view::OffsetView;
use crate::data::parser_utils::{
    Record, Vector2, Vector3, Vector4, WResult, checked_count, parse_i32_array, parse_vector2,
    parse_vector3,
};
use crate::error::{AssetError, AssetResult, FileKind};
use crate::models::ParseOptions;

/// "IDSV" as a little-endian u32.
pub const VERTEX_FILE_ID: u32 = u32::from_le_bytes(*b"IDSV");

/// The only vertex file version this parser understands.
pub const VERTEX_FILE_VERSION: i32 = 4;

pub const MAX_NUM_LODS: usize = 8;
pub const MAX_BONES_PER_VERTEX: usize = 3;

pub const HEADER_SIZE: usize = 0x40;
pub const FIXUP_SIZE: usize = 0x0C;
pub const VERTEX_SIZE: usize = 0x30;
pub const TANGENT_SIZE: usize = 0x10;

/// Tangent with handedness in `w`.
pub type Tangent = Vector4;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VertexHeader {
    pub id: u32,
    pub version: i32,
    pub checksum: i32,
    pub lod_count: i32,
    /// Number of vertices used by each LOD, counting every vertex shared with lower LODs.
    pub lod_vertex_counts: [i32; MAX_NUM_LODS],
    pub fixup_count: i32,
    pub fixup_table_offset: i32,
    pub vertex_data_offset: i32,
    pub tangent_data_offset: i32,
}

impl Record for VertexHeader {
    const SIZE: usize = HEADER_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let id = le_u32.parse_next(input)?;
        let version = le_i32.parse_next(input)?;
        let checksum = le_i32.parse_next(input)?;
        let lod_count = le_i32.parse_next(input)?;
        let lod_vertex_counts = parse_i32_array::<MAX_NUM_LODS>(input)?;
        let fixup_count = le_i32.parse_next(input)?;
        let fixup_table_offset = le_i32.parse_next(input)?;
        let vertex_data_offset = le_i32.parse_next(input)?;
        let tangent_data_offset = le_i32.parse_next(input)?;
        Ok(VertexHeader {
            id,
            version,
            checksum,
            lod_count,
            lod_vertex_counts,
            fixup_count,
            fixup_table_offset,
            vertex_data_offset,
            tangent_data_offset,
        })
    }
}

/// A run of on-disk vertices used by LODs `lod` and below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fixup {
    pub lod: i32,
    pub source_vertex_id: i32,
    pub vertex_count: i32,
}

impl Record for Fixup {
    const SIZE: usize = FIXUP_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let lod = le_i32.parse_next(input)?;
        let source_vertex_id = le_i32.parse_next(input)?;
        let vertex_count = le_i32.parse_next(input)?;
        Ok(Fixup {
            lod,
            source_vertex_id,
            vertex_count,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BoneWeights {
    pub weights: [f32; MAX_BONES_PER_VERTEX],
    pub bones: [i8; MAX_BONES_PER_VERTEX],
    pub bone_count: u8,
}

impl BoneWeights {
    /// `(bone, weight)` pairs actually used by the vertex.
    pub fn influences(&self) -> impl Iterator<Item = (i8, f32)> + '_ {
        let used = usize::from(self.bone_count).min(MAX_BONES_PER_VERTEX);
        self.bones[..used]
            .iter()
            .copied()
            .zip(self.weights[..used].iter().copied())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vertex {
    pub bone_weights: BoneWeights,
    pub position: Vector3,
    pub normal: Vector3,
    pub tex_coord: Vector2,
}

impl Record for Vertex {
    const SIZE: usize = VERTEX_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let mut weights = [0.0f32; MAX_BONES_PER_VERTEX];
        for weight in weights.iter_mut() {
            *weight = le_f32.parse_next(input)?;
        }
        let mut bones = [0i8; MAX_BONES_PER_VERTEX];
        for bone in bones.iter_mut() {
            *bone = le_i8.parse_next(input)?;
        }
        let bone_count = le_u8.parse_next(input)?;
        let position = parse_vector3(input)?;
        let normal = parse_vector3(input)?;
        let tex_coord = parse_vector2(input)?;
        Ok(Vertex {
            bone_weights: BoneWeights {
                weights,
                bones,
                bone_count,
            },
            position,
            normal,
            tex_coord,
        })
    }
}

/// A vertex file with its vertex and tangent arrays in LOD order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VertexFile {
    header: VertexHeader,
    root_lod: usize,
    fixups: Vec<Fixup>,
    vertices: Vec<Vertex>,
    tangents: Vec<Tangent>,
}

impl VertexFile {
    /// Parse a vertex file for root LOD 0.
    ///
    /// When `expected_checksum` is given (normally the model file's checksum)
    /// it must match the vertex file's own.
    pub fn parse(data: &[u8], expected_checksum: Option<i32>) -> AssetResult<VertexFile> {
        Self::parse_with_options(data, expected_checksum, &ParseOptions::default())
    }

    pub fn parse_with_options(
        data: &[u8],
        expected_checksum: Option<i32>,
        options: &ParseOptions,
    ) -> AssetResult<VertexFile> {
        let view = OffsetView::new(data);
        let header = view.parse_record::<VertexHeader>(0)?;

        if header.id != VERTEX_FILE_ID {
            return Err(Report::new(AssetError::InvalidHeader {
                file: FileKind::Vertex,
                expected: VERTEX_FILE_ID,
                found: header.id,
            }));
        }
        if header.version != VERTEX_FILE_VERSION {
            return Err(Report::new(AssetError::UnsupportedVersion {
                file: FileKind::Vertex,
                version: header.version,
                supported: VERTEX_FILE_VERSION,
            }));
        }
        if let Some(expected) = expected_checksum.filter(|&expected| expected != header.checksum) {
            return Err(Report::new(AssetError::InvalidChecksum {
                file: FileKind::Vertex,
                field: "checksum",
                expected,
                found: header.checksum,
            }));
        }

        let root_lod = options.root_lod;
        if root_lod >= MAX_NUM_LODS || (root_lod > 0 && root_lod as i64 >= i64::from(header.lod_count))
        {
            return Err(Report::new(AssetError::invalid_body(
                FileKind::Vertex,
                format!("root LOD {root_lod} is outside the file's {} LODs", header.lod_count),
            )));
        }

        // The on-disk arrays always hold every LOD 0 vertex; fixups index into them.
        let vertex_count =
            checked_count(FileKind::Vertex, "vertex", header.lod_vertex_counts[0])?;
        let fixup_count = checked_count(FileKind::Vertex, "fixup", header.fixup_count)?;

        let required = FIXUP_SIZE
            .checked_mul(fixup_count)
            .and_then(|fixups| {
                (TANGENT_SIZE + VERTEX_SIZE)
                    .checked_mul(vertex_count)
                    .and_then(|vertices| vertices.checked_add(fixups))
            })
            .and_then(|body| body.checked_add(HEADER_SIZE));
        if required.is_none_or(|required| required > data.len()) {
            return Err(Report::new(AssetError::invalid_body(
                FileKind::Vertex,
                format!(
                    "{fixup_count} fixups and {vertex_count} vertices do not fit in {} bytes",
                    data.len()
                ),
            )));
        }

        debug!(
            checksum = header.checksum,
            lods = header.lod_count,
            vertices = vertex_count,
            fixups = fixup_count,
            root_lod,
            "parsed vertex file header"
        );

        let fixups = view.parse_array::<Fixup>(header.fixup_table_offset, fixup_count)?;
        let raw_vertices = view.parse_array::<Vertex>(header.vertex_data_offset, vertex_count)?;
        let raw_tangents = view.parse_array::<Tangent>(header.tangent_data_offset, vertex_count)?;

        let (vertices, tangents) = if fixups.is_empty() {
            (raw_vertices, raw_tangents)
        } else {
            apply_fixups(&fixups, root_lod, &raw_vertices, &raw_tangents)?
        };

        let expected = i64::from(header.lod_vertex_counts[root_lod]);
        if !fixups.is_empty() && vertices.len() as i64 != expected {
            warn!(
                root_lod,
                expected,
                found = vertices.len(),
                "fixups do not add up to the declared LOD vertex count"
            );
        }

        Ok(VertexFile {
            header,
            root_lod,
            fixups,
            vertices,
            tangents,
        })
    }

    pub fn header(&self) -> &VertexHeader {
        &self.header
    }

    pub fn checksum(&self) -> i32 {
        self.header.checksum
    }

    pub fn lod_count(&self) -> i32 {
        self.header.lod_count
    }

    /// LOD the vertex arrays were reconstructed for.
    pub fn root_lod(&self) -> usize {
        self.root_lod
    }

    pub fn fixups(&self) -> &[Fixup] {
        &self.fixups
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Tangents, index-aligned with [`Self::vertices`].
    pub fn tangents(&self) -> &[Tangent] {
        &self.tangents
    }

    pub fn vertex(&self, index: i64) -> AssetResult<&Vertex> {
        lookup(&self.vertices, index)
    }

    pub fn tangent(&self, index: i64) -> AssetResult<&Tangent> {
        lookup(&self.tangents, index)
    }
}

fn lookup<T>(items: &[T], index: i64) -> AssetResult<&T> {
    usize::try_from(index)
        .ok()
        .and_then(|index| items.get(index))
        .ok_or_else(|| Report::new(AssetError::out_of_bounds(index, 1, items.len())))
}

/// Concatenate, in table order, every fixup run needed by `root_lod`.
fn apply_fixups(
    fixups: &[Fixup],
    root_lod: usize,
    raw_vertices: &[Vertex],
    raw_tangents: &[Tangent],
) -> AssetResult<(Vec<Vertex>, Vec<Tangent>)> {
    let mut vertices = Vec::with_capacity(raw_vertices.len());
    let mut tangents = Vec::with_capacity(raw_tangents.len());

    for fixup in fixups {
        if i64::from(fixup.lod) < root_lod as i64
            || fixup.vertex_count <= 0
            || fixup.source_vertex_id < 0
        {
            trace!(?fixup, "skipping fixup");
            continue;
        }

        let start = fixup.source_vertex_id as usize;
        let count = fixup.vertex_count as usize;
        let end = start + count;
        if end > raw_vertices.len() {
            return Err(Report::new(AssetError::out_of_bounds(
                i64::from(fixup.source_vertex_id),
                count,
                raw_vertices.len(),
            )));
        }

        vertices.extend_from_slice(&raw_vertices[start..end]);
        tangents.extend_from_slice(&raw_tangents[start..end]);
    }

    debug!(
        fixups = fixups.len(),
        vertices = vertices.len(),
        "applied vertex fixups"
    );
    Ok((vertices, tangents))
}
