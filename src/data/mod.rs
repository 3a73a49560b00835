/// Bounds-checked reads at relative offsets
pub mod offset_view;
/// Field-level decoding helpers shared by every format
pub mod parser_utils;

#[cfg(test)]
pub(crate) mod fixture;
