//! Decoding of compiled studio models: the `.mdl` descriptor, the `.vvd`
//! vertex file and the `.vtx` strip file.
//!
//! Parse the three files together with [`models::assets::ModelAssets::parse`],
//! or individually with [`models::mdl::ModelFile::parse`],
//! [`models::vvd::VertexFile::parse`] and [`models::vtx::StripFile::parse`].
//! All decoded structures own their data and are immutable.

/// Low-level parsing utilities shared by the file formats
pub mod data;
/// Error definitions
pub mod error;
/// Model file formats and the correlation between them
pub mod models;
