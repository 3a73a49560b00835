//! Parser for `.mdl` model descriptor files.
//!
//! The descriptor holds the skeleton, the texture tables and the
//! body part → model → mesh topology. Meshes only carry counts and offsets;
//! the actual vertex data lives in the vertex file (see [`crate::models::vvd`])
//! and the triangle strips in the strip file (see [`crate::models::vtx`]).
//!
//! Offsets follow the usual studio conventions:
//! - header tables (bones, textures, texture directories, skins, body parts)
//!   are relative to the header
//! - bone, texture and body part names are relative to their own record
//! - a body part's models and a model's meshes are relative to the parent record

use rootcause::Report;
use tracing::{debug, trace};
use winnow::Parser;
use winnow::binary::{le_f32, le_i32, le_u8, le_u32};

use crate::data::offset_view::{Located, OffsetView};
use crate::data::parser_utils::{
    Matrix3x4, Quaternion, RadianEuler, Record, Vector3, WResult, checked_count,
    parse_fixed_string, parse_i32_array, parse_matrix3x4, parse_vector3, parse_vector4, skip,
};
use crate::error::{AssetError, AssetResult, FileKind};
use crate::models::vvd::{TANGENT_SIZE, VERTEX_SIZE};

/// "IDST" as a little-endian u32.
pub const MODEL_ID: u32 = u32::from_le_bytes(*b"IDST");

/// Newest descriptor version this parser understands.
pub const MAX_MODEL_VERSION: i32 = 48;

/// `parent` value of a bone with no parent.
pub const ROOT_BONE_PARENT: i32 = -1;

pub const HEADER_SIZE: usize = 0x198;
const SECONDARY_HEADER_SIZE: usize = 0x100;
const BONE_SIZE: usize = 0xD8;
const TEXTURE_SIZE: usize = 0x40;
const BODY_PART_SIZE: usize = 0x10;
const MODEL_SIZE: usize = 0x94;
const MESH_SIZE: usize = 0x74;

/// Fixed leading record of a model file.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModelHeader {
    pub id: u32,
    pub version: i32,
    pub checksum: i32,
    pub name: String,
    /// Size of the file as recorded by the compiler.
    pub data_length: i32,
    pub eye_position: Vector3,
    pub illum_position: Vector3,
    pub hull_min: Vector3,
    pub hull_max: Vector3,
    pub view_min: Vector3,
    pub view_max: Vector3,
    pub flags: i32,

    pub bone_count: i32,
    pub bone_offset: i32,

    pub texture_count: i32,
    pub texture_offset: i32,
    pub texture_dir_count: i32,
    pub texture_dir_offset: i32,

    pub skin_ref_count: i32,
    pub skin_family_count: i32,
    pub skin_ref_offset: i32,

    pub body_part_count: i32,
    pub body_part_offset: i32,

    pub mass: f32,
    pub contents: i32,

    pub directional_dot_product: u8,
    pub root_lod: u8,
    pub num_allowed_root_lods: u8,
    pub vert_anim_fixed_point_scale: f32,

    /// Offset of the [`SecondaryHeader`], relative to this header.
    pub secondary_header_offset: i32,
}

impl Record for ModelHeader {
    const SIZE: usize = HEADER_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let id = le_u32.parse_next(input)?;
        let version = le_i32.parse_next(input)?;
        let checksum = le_i32.parse_next(input)?;
        let name = parse_fixed_string(input, 64)?;
        let data_length = le_i32.parse_next(input)?;
        let eye_position = parse_vector3(input)?;
        let illum_position = parse_vector3(input)?;
        let hull_min = parse_vector3(input)?;
        let hull_max = parse_vector3(input)?;
        let view_min = parse_vector3(input)?;
        let view_max = parse_vector3(input)?;
        let flags = le_i32.parse_next(input)?;

        let bone_count = le_i32.parse_next(input)?;
        let bone_offset = le_i32.parse_next(input)?;
        // bone controllers, hitbox sets, local animations, local sequences,
        // activity list version and events-indexed flag
        skip(input, 0x28)?;

        let texture_count = le_i32.parse_next(input)?;
        let texture_offset = le_i32.parse_next(input)?;
        let texture_dir_count = le_i32.parse_next(input)?;
        let texture_dir_offset = le_i32.parse_next(input)?;

        let skin_ref_count = le_i32.parse_next(input)?;
        let skin_family_count = le_i32.parse_next(input)?;
        let skin_ref_offset = le_i32.parse_next(input)?;

        let body_part_count = le_i32.parse_next(input)?;
        let body_part_offset = le_i32.parse_next(input)?;

        // attachments through ik locks
        skip(input, 0x58)?;
        let mass = le_f32.parse_next(input)?;
        let contents = le_i32.parse_next(input)?;
        // include models through offset base
        skip(input, 0x28)?;

        let directional_dot_product = le_u8.parse_next(input)?;
        let root_lod = le_u8.parse_next(input)?;
        let num_allowed_root_lods = le_u8.parse_next(input)?;
        skip(input, 1 + 4)?;
        // flex controller UI count and offset
        skip(input, 8)?;
        let vert_anim_fixed_point_scale = le_f32.parse_next(input)?;
        skip(input, 4)?;
        let secondary_header_offset = le_i32.parse_next(input)?;
        skip(input, 4)?;

        Ok(ModelHeader {
            id,
            version,
            checksum,
            name,
            data_length,
            eye_position,
            illum_position,
            hull_min,
            hull_max,
            view_min,
            view_max,
            flags,
            bone_count,
            bone_offset,
            texture_count,
            texture_offset,
            texture_dir_count,
            texture_dir_offset,
            skin_ref_count,
            skin_family_count,
            skin_ref_offset,
            body_part_count,
            body_part_offset,
            mass,
            contents,
            directional_dot_product,
            root_lod,
            num_allowed_root_lods,
            vert_anim_fixed_point_scale,
            secondary_header_offset,
        })
    }
}

/// Extended header present in newer compiles.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SecondaryHeader {
    pub src_bone_transform_count: i32,
    pub src_bone_transform_offset: i32,
    pub illum_position_attachment_index: i32,
    pub max_eye_deflection: f32,
    pub linear_bone_offset: i32,
    pub name: Option<String>,
    pub bone_flex_driver_count: i32,
    pub bone_flex_driver_offset: i32,
}

struct SecondaryHeaderFields {
    src_bone_transform_count: i32,
    src_bone_transform_offset: i32,
    illum_position_attachment_index: i32,
    max_eye_deflection: f32,
    linear_bone_offset: i32,
    name_offset: i32,
    bone_flex_driver_count: i32,
    bone_flex_driver_offset: i32,
}

impl Record for SecondaryHeaderFields {
    const SIZE: usize = SECONDARY_HEADER_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let src_bone_transform_count = le_i32.parse_next(input)?;
        let src_bone_transform_offset = le_i32.parse_next(input)?;
        let illum_position_attachment_index = le_i32.parse_next(input)?;
        let max_eye_deflection = le_f32.parse_next(input)?;
        let linear_bone_offset = le_i32.parse_next(input)?;
        let name_offset = le_i32.parse_next(input)?;
        let bone_flex_driver_count = le_i32.parse_next(input)?;
        let bone_flex_driver_offset = le_i32.parse_next(input)?;
        skip(input, 56 * 4)?;
        Ok(SecondaryHeaderFields {
            src_bone_transform_count,
            src_bone_transform_offset,
            illum_position_attachment_index,
            max_eye_deflection,
            linear_bone_offset,
            name_offset,
            bone_flex_driver_count,
            bone_flex_driver_offset,
        })
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone, or [`ROOT_BONE_PARENT`].
    pub parent: i32,
    pub bone_controllers: [i32; 6],
    pub position: Vector3,
    pub orientation: Quaternion,
    pub orientation_euler: RadianEuler,
    pub position_scale: Vector3,
    pub orientation_scale: Vector3,
    /// Transforms model space vertices into bone space for skinning.
    pub pose_to_bone: Matrix3x4,
    pub alignment: Quaternion,
    pub flags: i32,
    pub procedural_type: i32,
    pub procedural_index: i32,
    pub physics_bone_index: i32,
    pub surface_prop: Option<String>,
    pub contents: i32,
}

impl Bone {
    pub fn parent_index(&self) -> Option<usize> {
        usize::try_from(self.parent).ok()
    }
}

struct BoneFields {
    name_offset: i32,
    parent: i32,
    bone_controllers: [i32; 6],
    position: Vector3,
    orientation: Quaternion,
    orientation_euler: RadianEuler,
    position_scale: Vector3,
    orientation_scale: Vector3,
    pose_to_bone: Matrix3x4,
    alignment: Quaternion,
    flags: i32,
    procedural_type: i32,
    procedural_index: i32,
    physics_bone_index: i32,
    surface_prop_offset: i32,
    contents: i32,
}

impl Record for BoneFields {
    const SIZE: usize = BONE_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let name_offset = le_i32.parse_next(input)?;
        let parent = le_i32.parse_next(input)?;
        let bone_controllers = parse_i32_array::<6>(input)?;
        let position = parse_vector3(input)?;
        let orientation = parse_vector4(input)?;
        let orientation_euler = parse_vector3(input)?;
        let position_scale = parse_vector3(input)?;
        let orientation_scale = parse_vector3(input)?;
        let pose_to_bone = parse_matrix3x4(input)?;
        let alignment = parse_vector4(input)?;
        let flags = le_i32.parse_next(input)?;
        let procedural_type = le_i32.parse_next(input)?;
        let procedural_index = le_i32.parse_next(input)?;
        let physics_bone_index = le_i32.parse_next(input)?;
        let surface_prop_offset = le_i32.parse_next(input)?;
        let contents = le_i32.parse_next(input)?;
        skip(input, 8 * 4)?;
        Ok(BoneFields {
            name_offset,
            parent,
            bone_controllers,
            position,
            orientation,
            orientation_euler,
            position_scale,
            orientation_scale,
            pose_to_bone,
            alignment,
            flags,
            procedural_type,
            procedural_index,
            physics_bone_index,
            surface_prop_offset,
            contents,
        })
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Texture {
    /// File name only; search [`ModelFile::texture_directories`] for the full path.
    pub name: String,
    pub flags: i32,
}

struct TextureFields {
    name_offset: i32,
    flags: i32,
}

impl Record for TextureFields {
    const SIZE: usize = TEXTURE_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let name_offset = le_i32.parse_next(input)?;
        let flags = le_i32.parse_next(input)?;
        // used flag, material pointers and reserved space
        skip(input, TEXTURE_SIZE - 8)?;
        Ok(TextureFields { name_offset, flags })
    }
}

/// A group of models of which exactly one is displayed at a time.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BodyPart {
    pub name: String,
    pub base: i32,
    pub models: Vec<Model>,
}

struct BodyPartFields {
    name_offset: i32,
    model_count: i32,
    base: i32,
    model_offset: i32,
}

impl Record for BodyPartFields {
    const SIZE: usize = BODY_PART_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let name_offset = le_i32.parse_next(input)?;
        let model_count = le_i32.parse_next(input)?;
        let base = le_i32.parse_next(input)?;
        let model_offset = le_i32.parse_next(input)?;
        Ok(BodyPartFields {
            name_offset,
            model_count,
            base,
            model_offset,
        })
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Model {
    pub name: String,
    pub model_type: i32,
    pub bounding_radius: f32,
    pub meshes: Vec<Mesh>,
    /// Index of this model's first vertex in the reconstructed vertex array.
    pub vertex_offset: i32,
    /// Index of this model's first tangent in the reconstructed tangent array.
    pub tangent_offset: i32,
    pub vertex_count: i32,
    pub attachment_count: i32,
    pub eyeball_count: i32,
}

struct ModelFields {
    name: String,
    model_type: i32,
    bounding_radius: f32,
    mesh_count: i32,
    mesh_offset: i32,
    vertex_count: i32,
    vertex_byte_offset: i32,
    tangent_byte_offset: i32,
    attachment_count: i32,
    eyeball_count: i32,
}

impl Record for ModelFields {
    const SIZE: usize = MODEL_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let name = parse_fixed_string(input, 64)?;
        let model_type = le_i32.parse_next(input)?;
        let bounding_radius = le_f32.parse_next(input)?;
        let mesh_count = le_i32.parse_next(input)?;
        let mesh_offset = le_i32.parse_next(input)?;
        let vertex_count = le_i32.parse_next(input)?;
        let vertex_byte_offset = le_i32.parse_next(input)?;
        let tangent_byte_offset = le_i32.parse_next(input)?;
        let attachment_count = le_i32.parse_next(input)?;
        let _attachment_offset = le_i32.parse_next(input)?;
        let eyeball_count = le_i32.parse_next(input)?;
        let _eyeball_offset = le_i32.parse_next(input)?;
        // runtime vertex data pointers and reserved space
        skip(input, 8 + 8 * 4)?;
        Ok(ModelFields {
            name,
            model_type,
            bounding_radius,
            mesh_count,
            mesh_offset,
            vertex_count,
            vertex_byte_offset,
            tangent_byte_offset,
            attachment_count,
            eyeball_count,
        })
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mesh {
    /// Column of the skin table used by this mesh.
    pub material: i32,
    /// Added to the owning model's vertex and tangent offsets.
    pub vertex_offset: i32,
    pub vertex_count: i32,
    pub flex_count: i32,
    pub material_type: i32,
    pub material_param: i32,
    pub mesh_id: i32,
    pub center: Vector3,
}

impl Record for Mesh {
    const SIZE: usize = MESH_SIZE;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let material = le_i32.parse_next(input)?;
        let _model_index = le_i32.parse_next(input)?;
        let vertex_count = le_i32.parse_next(input)?;
        let vertex_offset = le_i32.parse_next(input)?;
        let flex_count = le_i32.parse_next(input)?;
        let _flex_offset = le_i32.parse_next(input)?;
        let material_type = le_i32.parse_next(input)?;
        let material_param = le_i32.parse_next(input)?;
        let mesh_id = le_i32.parse_next(input)?;
        let center = parse_vector3(input)?;
        // runtime vertex data and reserved space
        skip(input, 9 * 4 + 8 * 4)?;
        Ok(Mesh {
            material,
            vertex_offset,
            vertex_count,
            flex_count,
            material_type,
            material_param,
            mesh_id,
            center,
        })
    }
}

/// A fully decoded model descriptor file.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModelFile {
    header: ModelHeader,
    secondary_header: Option<SecondaryHeader>,
    bones: Vec<Bone>,
    textures: Vec<Texture>,
    texture_directories: Vec<String>,
    skin_table: Vec<Vec<i16>>,
    body_parts: Vec<BodyPart>,
}

impl ModelFile {
    /// Parse a model descriptor. All data is copied out of `data`.
    pub fn parse(data: &[u8]) -> AssetResult<ModelFile> {
        let view = OffsetView::new(data);
        let header = view.parse_record::<ModelHeader>(0)?;

        if header.id != MODEL_ID {
            return Err(Report::new(AssetError::InvalidHeader {
                file: FileKind::Model,
                expected: MODEL_ID,
                found: header.id,
            }));
        }
        if header.version > MAX_MODEL_VERSION {
            return Err(Report::new(AssetError::UnsupportedVersion {
                file: FileKind::Model,
                version: header.version,
                supported: MAX_MODEL_VERSION,
            }));
        }

        debug!(
            name = %header.name,
            version = header.version,
            checksum = header.checksum,
            "parsed model header"
        );

        let secondary_header = parse_secondary_header(&view, &header)?;
        let bones = parse_bones(&view, &header)?;
        let textures = parse_textures(&view, &header)?;
        let texture_directories = parse_texture_directories(&view, &header)?;
        let skin_table = parse_skin_table(&view, &header)?;
        let body_parts = parse_body_parts(&view, &header)?;

        debug!(
            bones = bones.len(),
            textures = textures.len(),
            skin_families = skin_table.len(),
            body_parts = body_parts.len(),
            "parsed model body"
        );

        Ok(ModelFile {
            header,
            secondary_header,
            bones,
            textures,
            texture_directories,
            skin_table,
            body_parts,
        })
    }

    pub fn header(&self) -> &ModelHeader {
        &self.header
    }

    /// Checksum shared by the model, vertex and strip files of one compile.
    pub fn checksum(&self) -> i32 {
        self.header.checksum
    }

    pub fn secondary_header(&self) -> Option<&SecondaryHeader> {
        self.secondary_header.as_ref()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Directories, relative to the material root, that contain this model's textures.
    pub fn texture_directories(&self) -> &[String] {
        &self.texture_directories
    }

    /// [`Self::texture_directories`] with `\` separators replaced by `/`.
    pub fn normalised_texture_directories(&self) -> impl Iterator<Item = String> + '_ {
        self.texture_directories
            .iter()
            .map(|dir| dir.replace('\\', "/"))
    }

    /// Row-major skin table: `skin_table()[family][mesh.material]` is a texture index.
    pub fn skin_table(&self) -> &[Vec<i16>] {
        &self.skin_table
    }

    pub fn skin_family_count(&self) -> usize {
        self.skin_table.len()
    }

    /// Texture index used for `material` under skin `family`.
    pub fn skin_texture_index(&self, family: usize, material: i32) -> AssetResult<i16> {
        let row = self.skin_table.get(family).ok_or_else(|| {
            Report::new(AssetError::out_of_bounds(
                family as i64,
                1,
                self.skin_table.len(),
            ))
        })?;
        usize::try_from(material)
            .ok()
            .and_then(|column| row.get(column))
            .copied()
            .ok_or_else(|| {
                Report::new(AssetError::out_of_bounds(
                    i64::from(material),
                    1,
                    row.len(),
                ))
            })
    }

    /// Texture used for `material` under skin `family`.
    pub fn texture_for(&self, family: usize, material: i32) -> AssetResult<&Texture> {
        let index = self.skin_texture_index(family, material)?;
        usize::try_from(index)
            .ok()
            .and_then(|index| self.textures.get(index))
            .ok_or_else(|| {
                Report::new(AssetError::out_of_bounds(
                    i64::from(index),
                    1,
                    self.textures.len(),
                ))
            })
    }

    pub fn body_parts(&self) -> &[BodyPart] {
        &self.body_parts
    }
}

fn parse_secondary_header(
    view: &OffsetView<'_>,
    header: &ModelHeader,
) -> AssetResult<Option<SecondaryHeader>> {
    let present = usize::try_from(header.secondary_header_offset)
        .is_ok_and(|offset| offset >= HEADER_SIZE);
    if !present {
        return Ok(None);
    }

    let Located { record, view } =
        view.parse_located::<SecondaryHeaderFields>(header.secondary_header_offset)?;
    let name = if record.name_offset != 0 {
        Some(view.parse_string(record.name_offset)?)
    } else {
        None
    };
    debug!(offset = header.secondary_header_offset, "model has a secondary header");

    Ok(Some(SecondaryHeader {
        src_bone_transform_count: record.src_bone_transform_count,
        src_bone_transform_offset: record.src_bone_transform_offset,
        illum_position_attachment_index: record.illum_position_attachment_index,
        max_eye_deflection: record.max_eye_deflection,
        linear_bone_offset: record.linear_bone_offset,
        name,
        bone_flex_driver_count: record.bone_flex_driver_count,
        bone_flex_driver_offset: record.bone_flex_driver_offset,
    }))
}

fn parse_bones(view: &OffsetView<'_>, header: &ModelHeader) -> AssetResult<Vec<Bone>> {
    let count = checked_count(FileKind::Model, "bone", header.bone_count)?;
    view.parse_located_array::<BoneFields>(header.bone_offset, count)?
        .into_iter()
        .map(|Located { record, view }| {
            let surface_prop = if record.surface_prop_offset != 0 {
                Some(view.parse_string(record.surface_prop_offset)?)
            } else {
                None
            };
            Ok(Bone {
                name: view.parse_string(record.name_offset)?,
                parent: record.parent,
                bone_controllers: record.bone_controllers,
                position: record.position,
                orientation: record.orientation,
                orientation_euler: record.orientation_euler,
                position_scale: record.position_scale,
                orientation_scale: record.orientation_scale,
                pose_to_bone: record.pose_to_bone,
                alignment: record.alignment,
                flags: record.flags,
                procedural_type: record.procedural_type,
                procedural_index: record.procedural_index,
                physics_bone_index: record.physics_bone_index,
                surface_prop,
                contents: record.contents,
            })
        })
        .collect()
}

fn parse_textures(view: &OffsetView<'_>, header: &ModelHeader) -> AssetResult<Vec<Texture>> {
    let count = checked_count(FileKind::Model, "texture", header.texture_count)?;
    view.parse_located_array::<TextureFields>(header.texture_offset, count)?
        .into_iter()
        .map(|Located { record, view }| {
            Ok(Texture {
                name: view.parse_string(record.name_offset)?,
                flags: record.flags,
            })
        })
        .collect()
}

fn parse_texture_directories(
    view: &OffsetView<'_>,
    header: &ModelHeader,
) -> AssetResult<Vec<String>> {
    let count = checked_count(FileKind::Model, "texture directory", header.texture_dir_count)?;
    view.parse_array::<i32>(header.texture_dir_offset, count)?
        .into_iter()
        .map(|offset| view.parse_string(offset))
        .collect()
}

fn parse_skin_table(view: &OffsetView<'_>, header: &ModelHeader) -> AssetResult<Vec<Vec<i16>>> {
    let families = checked_count(FileKind::Model, "skin family", header.skin_family_count)?;
    let refs = checked_count(FileKind::Model, "skin reference", header.skin_ref_count)?;
    let row_size = (refs * i16::SIZE) as i64;

    (0..families)
        .map(|family| {
            let row_offset = i64::from(header.skin_ref_offset) + family as i64 * row_size;
            view.parse_array::<i16>(row_offset, refs)
        })
        .collect()
}

fn parse_body_parts(view: &OffsetView<'_>, header: &ModelHeader) -> AssetResult<Vec<BodyPart>> {
    let count = checked_count(FileKind::Model, "body part", header.body_part_count)?;
    view.parse_located_array::<BodyPartFields>(header.body_part_offset, count)?
        .into_iter()
        .map(|Located { record, view }| {
            let name = view.parse_string(record.name_offset)?;
            let model_count = checked_count(FileKind::Model, "model", record.model_count)?;
            let models = view
                .parse_located_array::<ModelFields>(record.model_offset, model_count)?
                .into_iter()
                .map(parse_model)
                .collect::<AssetResult<Vec<_>>>()?;
            trace!(name = %name, models = models.len(), "parsed body part");
            Ok(BodyPart {
                name,
                base: record.base,
                models,
            })
        })
        .collect()
}

fn parse_model(Located { record, view }: Located<'_, ModelFields>) -> AssetResult<Model> {
    let mesh_count = checked_count(FileKind::Model, "mesh", record.mesh_count)?;
    let meshes = view.parse_array::<Mesh>(record.mesh_offset, mesh_count)?;

    Ok(Model {
        vertex_offset: to_element_index(record.vertex_byte_offset, VERTEX_SIZE, "vertex")?,
        tangent_offset: to_element_index(record.tangent_byte_offset, TANGENT_SIZE, "tangent")?,
        name: record.name,
        model_type: record.model_type,
        bounding_radius: record.bounding_radius,
        meshes,
        vertex_count: record.vertex_count,
        attachment_count: record.attachment_count,
        eyeball_count: record.eyeball_count,
    })
}

/// Convert a byte offset into the vertex file's data into an element index.
fn to_element_index(byte_offset: i32, element_size: usize, what: &str) -> AssetResult<i32> {
    let element_size = element_size as i32;
    if byte_offset < 0 || byte_offset % element_size != 0 {
        return Err(Report::new(AssetError::invalid_body(
            FileKind::Model,
            format!("{what} offset {byte_offset} is not a multiple of {element_size}"),
        )));
    }
    Ok(byte_offset / element_size)
}
