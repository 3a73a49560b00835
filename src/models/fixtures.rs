//! Builders for small, internally consistent model/vertex/strip buffers.

use crate::data::fixture::ByteWriter;
use crate::models::mdl;
use crate::models::vtx;
use crate::models::vvd;

/// Strings whose offsets are patched once the string pool is written.
#[derive(Default)]
struct StringPool {
    pending: Vec<(usize, usize, String)>,
}

impl StringPool {
    /// Record that the `i32` at `field` holds the offset of `value` relative to `record`.
    fn defer(&mut self, record: usize, field: usize, value: &str) {
        self.pending.push((record, field, value.to_owned()));
    }

    fn write(self, w: &mut ByteWriter) {
        for (record, field, value) in self.pending {
            let at = w.position();
            w.cstr(&value);
            w.patch_i32(field, (at - record) as i32);
        }
    }
}

/// Header of an otherwise empty model file.
pub fn model_header_bytes(version: i32, checksum: i32) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.bytes(b"IDST").i32(version).i32(checksum);
    w.zeros(mdl::HEADER_SIZE - w.position());
    w.finish()
}

#[derive(Debug, Clone, Default)]
pub struct BoneFixture {
    pub name: &'static str,
    pub parent: i32,
    pub position: [f32; 3],
    pub surface_prop: Option<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct MeshFixture {
    pub material: i32,
    pub vertex_offset: i32,
    pub vertex_count: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ModelPartFixture {
    pub name: &'static str,
    pub vertex_byte_offset: i32,
    pub tangent_byte_offset: i32,
    pub vertex_count: i32,
    pub meshes: Vec<MeshFixture>,
    pub mesh_count_override: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct BodyPartFixture {
    pub name: &'static str,
    pub models: Vec<ModelPartFixture>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelFixture {
    pub version: i32,
    pub checksum: i32,
    pub bones: Vec<BoneFixture>,
    pub textures: Vec<&'static str>,
    pub texture_dirs: Vec<&'static str>,
    pub skin_table: Vec<Vec<i16>>,
    pub secondary_name: Option<&'static str>,
    pub body_parts: Vec<BodyPartFixture>,
    pub bone_name_offset_override: Option<i32>,
}

impl ModelFixture {
    /// Two bones, three textures, two skin families and one body part whose
    /// single model has two meshes over five vertices.
    pub fn sample() -> Self {
        ModelFixture {
            version: 48,
            checksum: 7,
            bones: vec![
                BoneFixture {
                    name: "root",
                    parent: mdl::ROOT_BONE_PARENT,
                    position: [0.0, 0.0, 0.0],
                    surface_prop: None,
                },
                BoneFixture {
                    name: "spine",
                    parent: 0,
                    position: [0.0, 2.0, 0.0],
                    surface_prop: Some("flesh"),
                },
            ],
            textures: vec!["skin_a", "skin_b", "eyes"],
            texture_dirs: vec!["models\\props\\"],
            skin_table: vec![vec![0, 2], vec![1, 2]],
            secondary_name: Some("sample.mdl"),
            body_parts: vec![BodyPartFixture {
                name: "body",
                models: vec![ModelPartFixture {
                    name: "body_ref",
                    vertex_byte_offset: 0,
                    tangent_byte_offset: 0,
                    vertex_count: 5,
                    meshes: vec![
                        MeshFixture {
                            material: 0,
                            vertex_offset: 0,
                            vertex_count: 3,
                        },
                        MeshFixture {
                            material: 1,
                            vertex_offset: 3,
                            vertex_count: 2,
                        },
                    ],
                    mesh_count_override: None,
                }],
            }],
            bone_name_offset_override: None,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        const BONE_SIZE: usize = 0xD8;
        const TEXTURE_SIZE: usize = 0x40;
        const BODY_PART_SIZE: usize = 0x10;
        const MODEL_SIZE: usize = 0x94;
        const MESH_SIZE: usize = 0x74;

        let mut w = ByteWriter::new();
        let mut strings = StringPool::default();

        w.bytes(b"IDST").i32(self.version).i32(self.checksum);
        w.fixed_str("sample", 64);
        w.zeros(mdl::HEADER_SIZE - w.position());

        if let Some(name) = self.secondary_name {
            let at = w.position();
            w.patch_i32(0x190, at as i32);
            w.zeros(0x100);
            strings.defer(at, at + 0x14, name);
        }

        let bones_at = w.position();
        w.patch_i32(0x9C, self.bones.len() as i32)
            .patch_i32(0xA0, bones_at as i32);
        for bone in &self.bones {
            let at = w.position();
            w.zeros(BONE_SIZE);
            w.patch_i32(at + 4, bone.parent);
            for (i, component) in bone.position.iter().enumerate() {
                w.patch_f32(at + 0x20 + i * 4, *component);
            }
            strings.defer(at, at, bone.name);
            if let Some(surface_prop) = bone.surface_prop {
                strings.defer(at, at + 0xB0, surface_prop);
            }
        }

        let textures_at = w.position();
        w.patch_i32(0xCC, self.textures.len() as i32)
            .patch_i32(0xD0, textures_at as i32);
        for texture in &self.textures {
            let at = w.position();
            w.zeros(TEXTURE_SIZE);
            strings.defer(at, at, texture);
        }

        let dirs_at = w.position();
        w.patch_i32(0xD4, self.texture_dirs.len() as i32)
            .patch_i32(0xD8, dirs_at as i32);
        for dir in &self.texture_dirs {
            let at = w.position();
            w.i32(0);
            strings.defer(0, at, dir);
        }

        let skins_at = w.position();
        let refs = self.skin_table.first().map_or(0, Vec::len);
        w.patch_i32(0xDC, refs as i32)
            .patch_i32(0xE0, self.skin_table.len() as i32)
            .patch_i32(0xE4, skins_at as i32);
        for index in self.skin_table.iter().flatten() {
            w.i16(*index);
        }

        let body_parts_at = w.position();
        w.patch_i32(0xE8, self.body_parts.len() as i32)
            .patch_i32(0xEC, body_parts_at as i32);
        w.zeros(BODY_PART_SIZE * self.body_parts.len());
        for (i, body_part) in self.body_parts.iter().enumerate() {
            let part_at = body_parts_at + i * BODY_PART_SIZE;
            let models_at = w.position();
            w.patch_i32(part_at + 4, body_part.models.len() as i32)
                .patch_i32(part_at + 0xC, (models_at - part_at) as i32);
            strings.defer(part_at, part_at, body_part.name);

            w.zeros(MODEL_SIZE * body_part.models.len());
            for (j, model) in body_part.models.iter().enumerate() {
                let model_at = models_at + j * MODEL_SIZE;
                let meshes_at = w.position();
                let mesh_count = model
                    .mesh_count_override
                    .unwrap_or(model.meshes.len() as i32);
                w.patch_bytes(model_at, model.name.as_bytes())
                    .patch_i32(model_at + 0x48, mesh_count)
                    .patch_i32(model_at + 0x4C, (meshes_at - model_at) as i32)
                    .patch_i32(model_at + 0x50, model.vertex_count)
                    .patch_i32(model_at + 0x54, model.vertex_byte_offset)
                    .patch_i32(model_at + 0x58, model.tangent_byte_offset);

                for (k, mesh) in model.meshes.iter().enumerate() {
                    let mesh_at = w.position();
                    w.i32(mesh.material)
                        .i32(j as i32)
                        .i32(mesh.vertex_count)
                        .i32(mesh.vertex_offset);
                    w.zeros(0x10);
                    w.i32(k as i32);
                    w.zeros(MESH_SIZE - (w.position() - mesh_at));
                }
            }
        }

        strings.write(&mut w);

        if let Some(offset) = self.bone_name_offset_override {
            for i in 0..self.bones.len() {
                w.patch_i32(bones_at + i * BONE_SIZE, offset);
            }
        }

        let len = w.position() as i32;
        w.patch_i32(0x4C, len);
        w.finish()
    }
}

#[derive(Debug, Clone)]
pub struct VertexFixture {
    pub version: i32,
    pub checksum: i32,
    pub lod_count: i32,
    pub lod_vertex_counts: Vec<i32>,
    pub fixups: Vec<(i32, i32, i32)>,
    /// Number of vertices actually written.
    pub vertex_count: usize,
}

impl VertexFixture {
    /// One LOD of `count` vertices where vertex `i` sits at `x = i` and its
    /// tangent has `x = i`.
    pub fn sequential(checksum: i32, count: usize) -> Self {
        VertexFixture {
            version: vvd::VERTEX_FILE_VERSION,
            checksum,
            lod_count: 1,
            lod_vertex_counts: vec![count as i32],
            fixups: Vec::new(),
            vertex_count: count,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.bytes(b"IDSV")
            .i32(self.version)
            .i32(self.checksum)
            .i32(self.lod_count);
        for lod in 0..vvd::MAX_NUM_LODS {
            w.i32(self.lod_vertex_counts.get(lod).copied().unwrap_or(0));
        }

        let fixups_at = vvd::HEADER_SIZE;
        let vertices_at = fixups_at + self.fixups.len() * vvd::FIXUP_SIZE;
        let tangents_at = vertices_at + self.vertex_count * vvd::VERTEX_SIZE;
        w.i32(self.fixups.len() as i32)
            .i32(fixups_at as i32)
            .i32(vertices_at as i32)
            .i32(tangents_at as i32);

        for &(lod, source, count) in &self.fixups {
            w.i32(lod).i32(source).i32(count);
        }

        for i in 0..self.vertex_count {
            w.f32s(&[1.0, 0.0, 0.0]);
            w.i8(0).i8(0).i8(0).u8(1);
            w.f32s(&[i as f32, 0.0, 0.0]);
            w.f32s(&[0.0, 0.0, 1.0]);
            w.f32s(&[0.5, 0.5]);
        }
        for i in 0..self.vertex_count {
            w.f32s(&[i as f32, 0.0, 0.0, 1.0]);
        }
        w.finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StripRange {
    pub index_offset: i32,
    pub index_count: i32,
    pub vertex_offset: i32,
    pub vertex_count: i32,
}

#[derive(Debug, Clone)]
pub struct StripGroupFixture {
    pub original_ids: Vec<u16>,
    pub indices: Vec<u16>,
    pub strips: Vec<StripRange>,
}

#[derive(Debug, Clone)]
pub struct StripModelFixture {
    pub lod_count_override: Option<i32>,
    /// LOD → mesh → strip group.
    pub lods: Vec<Vec<Vec<StripGroupFixture>>>,
}

#[derive(Debug, Clone)]
pub struct StripFixture {
    pub version: i32,
    pub checksum: i32,
    pub lod_count: i32,
    /// Body part → model.
    pub body_parts: Vec<Vec<StripModelFixture>>,
    /// One list per LOD.
    pub replacements: Vec<Vec<(i16, &'static str)>>,
}

impl StripFixture {
    /// One body part with one model whose every LOD matches the meshes of
    /// [`ModelFixture::sample`]: three vertices in the first mesh and two in
    /// the second.
    pub fn sample(checksum: i32, lod_count: i32) -> Self {
        let lod = vec![
            vec![StripGroupFixture {
                original_ids: vec![0, 1, 2],
                indices: vec![0, 1, 2],
                strips: vec![StripRange {
                    index_offset: 0,
                    index_count: 3,
                    vertex_offset: 0,
                    vertex_count: 3,
                }],
            }],
            vec![StripGroupFixture {
                original_ids: vec![0, 1],
                indices: vec![0, 1, 1],
                strips: vec![StripRange {
                    index_offset: 0,
                    index_count: 3,
                    vertex_offset: 0,
                    vertex_count: 2,
                }],
            }],
        ];
        let mut replacements = vec![Vec::new(); lod_count.max(0) as usize];
        if let Some(first) = replacements.first_mut() {
            first.push((1, "skin_alt"));
        }
        StripFixture {
            version: vtx::STRIP_FILE_VERSION,
            checksum,
            lod_count,
            body_parts: vec![vec![StripModelFixture {
                lod_count_override: None,
                lods: vec![lod; lod_count.max(0) as usize],
            }]],
            replacements,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        const BODY_PART_SIZE: usize = 0x08;
        const MODEL_SIZE: usize = 0x08;
        const MODEL_LOD_SIZE: usize = 0x0C;
        const MESH_SIZE: usize = 0x09;
        const STRIP_GROUP_SIZE: usize = 0x19;
        const LIST_SIZE: usize = 0x08;
        const REPLACEMENT_SIZE: usize = 0x06;

        let mut w = ByteWriter::new();
        let mut strings = StringPool::default();

        w.i32(self.version).i32(24).u16(53).u16(9).i32(3);
        w.i32(self.checksum).i32(self.lod_count);
        // material replacement list offset, patched below
        w.i32(0);
        w.i32(self.body_parts.len() as i32).i32(vtx::HEADER_SIZE as i32);

        w.zeros(BODY_PART_SIZE * self.body_parts.len());
        for (i, models) in self.body_parts.iter().enumerate() {
            let part_at = vtx::HEADER_SIZE + i * BODY_PART_SIZE;
            let models_at = w.position();
            w.patch_i32(part_at, models.len() as i32)
                .patch_i32(part_at + 4, (models_at - part_at) as i32);
            w.zeros(MODEL_SIZE * models.len());

            for (j, model) in models.iter().enumerate() {
                let model_at = models_at + j * MODEL_SIZE;
                let lods_at = w.position();
                let lod_count = model.lod_count_override.unwrap_or(model.lods.len() as i32);
                w.patch_i32(model_at, lod_count)
                    .patch_i32(model_at + 4, (lods_at - model_at) as i32);
                w.zeros(MODEL_LOD_SIZE * model.lods.len());

                for (l, meshes) in model.lods.iter().enumerate() {
                    let lod_at = lods_at + l * MODEL_LOD_SIZE;
                    let meshes_at = w.position();
                    w.patch_i32(lod_at, meshes.len() as i32)
                        .patch_i32(lod_at + 4, (meshes_at - lod_at) as i32)
                        .patch_f32(lod_at + 8, l as f32 * 10.0);
                    w.zeros(MESH_SIZE * meshes.len());

                    for (m, groups) in meshes.iter().enumerate() {
                        let mesh_at = meshes_at + m * MESH_SIZE;
                        let groups_at = w.position();
                        w.patch_i32(mesh_at, groups.len() as i32)
                            .patch_i32(mesh_at + 4, (groups_at - mesh_at) as i32);
                        w.zeros(STRIP_GROUP_SIZE * groups.len());

                        for (g, group) in groups.iter().enumerate() {
                            let group_at = groups_at + g * STRIP_GROUP_SIZE;
                            write_strip_group(&mut w, group_at, group);
                        }
                    }
                }
            }
        }

        let lists_at = w.position();
        w.patch_i32(0x18, lists_at as i32);
        w.zeros(LIST_SIZE * self.replacements.len());
        for (i, list) in self.replacements.iter().enumerate() {
            let list_at = lists_at + i * LIST_SIZE;
            let entries_at = w.position();
            w.patch_i32(list_at, list.len() as i32)
                .patch_i32(list_at + 4, (entries_at - list_at) as i32);
            for (k, &(material_id, name)) in list.iter().enumerate() {
                let entry_at = entries_at + k * REPLACEMENT_SIZE;
                w.i16(material_id).i32(0);
                strings.defer(entry_at, entry_at + 2, name);
            }
        }

        strings.write(&mut w);
        w.finish()
    }
}

fn write_strip_group(w: &mut ByteWriter, group_at: usize, group: &StripGroupFixture) {
    let vertices_at = w.position();
    for &id in &group.original_ids {
        w.bytes(&[0, 1, 2]).u8(1).u16(id).bytes(&[0, 0, 0]);
    }

    let indices_at = w.position();
    for &index in &group.indices {
        w.u16(index);
    }

    let strips_at = w.position();
    for strip in &group.strips {
        w.i32(strip.index_count)
            .i32(strip.index_offset)
            .i32(strip.vertex_count)
            .i32(strip.vertex_offset)
            .i16(1)
            .u8(0x02)
            .i32(0)
            .i32(0);
    }

    w.patch_i32(group_at, group.original_ids.len() as i32)
        .patch_i32(group_at + 4, (vertices_at - group_at) as i32)
        .patch_i32(group_at + 8, group.indices.len() as i32)
        .patch_i32(group_at + 12, (indices_at - group_at) as i32)
        .patch_i32(group_at + 16, group.strips.len() as i32)
        .patch_i32(group_at + 20, (strips_at - group_at) as i32);
}
