use bon::Builder;

/// Cross-file correlation of the descriptor and strip hierarchies
pub mod accessors;
/// Matched model/vertex/strip loading
pub mod assets;
/// `.mdl` model descriptor files
pub mod mdl;
/// `.vtx` strip files
pub mod vtx;
/// `.vvd` vertex files
pub mod vvd;

#[cfg(test)]
pub(crate) mod fixtures;

/// Options that change how the vertex data of a model is reconstructed.
#[derive(Clone, Builder, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseOptions {
    /// Most detailed LOD that will be rendered. Fixups for more detailed LODs are dropped.
    #[builder(default)]
    pub root_lod: usize,
}
