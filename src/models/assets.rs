//! Loading a model's descriptor, vertex and strip files together.

use rootcause::Report;
use tracing::{debug, warn};

use crate::error::{AssetError, AssetResult, FileKind};
use crate::models::ParseOptions;
use crate::models::accessors;
use crate::models::mdl::{self, ModelFile};
use crate::models::vtx::{self, StripFile};
use crate::models::vvd::{Tangent, Vertex, VertexFile};

/// The three files of one compiled model, checked against each other.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModelAssets {
    model: ModelFile,
    vertices: VertexFile,
    strip: StripFile,
}

impl ModelAssets {
    /// Parse the model file first, then the vertex and strip files using the
    /// model's checksum and the vertex file's LOD count.
    pub fn parse(
        model: &[u8],
        vertex: &[u8],
        strip: &[u8],
        options: &ParseOptions,
    ) -> AssetResult<ModelAssets> {
        let model = ModelFile::parse(model)?;
        let vertices = VertexFile::parse_with_options(vertex, Some(model.checksum()), options)?;
        let strip = StripFile::parse(strip, model.checksum(), vertices.lod_count())?;

        if usize::from(model.header().root_lod) != options.root_lod {
            warn!(
                requested = options.root_lod,
                declared = model.header().root_lod,
                "root LOD differs from the one the model was compiled with"
            );
        }

        let assets = ModelAssets {
            model,
            vertices,
            strip,
        };
        assets.check_hierarchies()?;

        debug!(
            name = %assets.model.header().name,
            checksum = assets.checksum(),
            lods = assets.lod_count(),
            vertices = assets.vertex_count(),
            "loaded model assets"
        );
        Ok(assets)
    }

    /// Both hierarchies must agree on the number of body parts and models.
    fn check_hierarchies(&self) -> AssetResult<()> {
        let mismatch = |what: &str, descriptor: usize, strip: usize| {
            Report::new(AssetError::invalid_body(
                FileKind::Strip,
                format!("strip file has {strip} {what} but the model file has {descriptor}"),
            ))
        };

        let descriptor_parts = self.model.body_parts();
        let strip_parts = self.strip.body_parts();
        if descriptor_parts.len() != strip_parts.len() {
            return Err(mismatch(
                "body parts",
                descriptor_parts.len(),
                strip_parts.len(),
            ));
        }

        accessors::for_each_body_part(&self.model, &self.strip, |descriptor, strip| {
            if descriptor.models.len() != strip.models.len() {
                return Err(mismatch(
                    "models",
                    descriptor.models.len(),
                    strip.models.len(),
                ));
            }
            Ok(())
        })
    }

    pub fn model(&self) -> &ModelFile {
        &self.model
    }

    pub fn vertex_file(&self) -> &VertexFile {
        &self.vertices
    }

    pub fn strip_file(&self) -> &StripFile {
        &self.strip
    }

    /// Checksum shared by all three files.
    pub fn checksum(&self) -> i32 {
        self.model.checksum()
    }

    pub fn lod_count(&self) -> i32 {
        self.strip.lod_count()
    }

    /// Length of the reconstructed vertex and tangent arrays.
    pub fn vertex_count(&self) -> usize {
        self.vertices.vertices().len()
    }

    pub fn vertex(&self, index: i64) -> AssetResult<&Vertex> {
        self.vertices.vertex(index)
    }

    pub fn tangent(&self, index: i64) -> AssetResult<&Tangent> {
        self.vertices.tangent(index)
    }

    /// Descriptor body parts paired with their strip counterparts.
    pub fn body_parts(&self) -> impl Iterator<Item = (&mdl::BodyPart, &vtx::BodyPart)> {
        self.model
            .body_parts()
            .iter()
            .zip(self.strip.body_parts().iter())
    }
}
