//! Shared winnow-based parsing utilities used by the model, vertex and strip parsers.

use rootcause::Report;
use winnow::Parser;
use winnow::binary::{le_f32, le_i16, le_i32, le_u8, le_u16};
use winnow::error::ContextError;
use winnow::token::take;

use crate::error::{AssetError, AssetResult, FileKind};

/// Common result type for winnow parsers.
pub type WResult<T> = Result<T, winnow::error::ErrMode<ContextError>>;

/// A fixed-size, tightly packed on-disk record.
///
/// `parse` is handed a slice of exactly `SIZE` bytes and decodes the fields in
/// file order. Records never read host memory directly.
pub trait Record: Sized {
    const SIZE: usize;

    fn parse(input: &mut &[u8]) -> WResult<Self>;
}

impl Record for i16 {
    const SIZE: usize = 2;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        le_i16.parse_next(input)
    }
}

impl Record for u16 {
    const SIZE: usize = 2;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        le_u16.parse_next(input)
    }
}

impl Record for i32 {
    const SIZE: usize = 4;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        le_i32.parse_next(input)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Four floats; used for quaternions and for per-vertex tangents (`w` holds the handedness).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

pub type Quaternion = Vector4;
pub type RadianEuler = Vector3;

/// Row-major 3x4 affine transform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Matrix3x4 {
    pub rows: [[f32; 4]; 3],
}

impl Record for Vector4 {
    const SIZE: usize = 16;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        parse_vector4(input)
    }
}

pub fn parse_vector2(input: &mut &[u8]) -> WResult<Vector2> {
    let x = le_f32.parse_next(input)?;
    let y = le_f32.parse_next(input)?;
    Ok(Vector2 { x, y })
}

pub fn parse_vector3(input: &mut &[u8]) -> WResult<Vector3> {
    let x = le_f32.parse_next(input)?;
    let y = le_f32.parse_next(input)?;
    let z = le_f32.parse_next(input)?;
    Ok(Vector3 { x, y, z })
}

pub fn parse_vector4(input: &mut &[u8]) -> WResult<Vector4> {
    let x = le_f32.parse_next(input)?;
    let y = le_f32.parse_next(input)?;
    let z = le_f32.parse_next(input)?;
    let w = le_f32.parse_next(input)?;
    Ok(Vector4 { x, y, z, w })
}

pub fn parse_matrix3x4(input: &mut &[u8]) -> WResult<Matrix3x4> {
    let mut rows = [[0.0f32; 4]; 3];
    for row in rows.iter_mut() {
        for value in row.iter_mut() {
            *value = le_f32.parse_next(input)?;
        }
    }
    Ok(Matrix3x4 { rows })
}

pub fn parse_i32_array<const N: usize>(input: &mut &[u8]) -> WResult<[i32; N]> {
    let mut values = [0i32; N];
    for value in values.iter_mut() {
        *value = le_i32.parse_next(input)?;
    }
    Ok(values)
}

pub fn parse_u8_array<const N: usize>(input: &mut &[u8]) -> WResult<[u8; N]> {
    let mut values = [0u8; N];
    for value in values.iter_mut() {
        *value = le_u8.parse_next(input)?;
    }
    Ok(values)
}

/// Skip `count` bytes of fields this crate does not surface.
pub fn skip(input: &mut &[u8], count: usize) -> WResult<()> {
    let _: &[u8] = take(count).parse_next(input)?;
    Ok(())
}

/// Decode an inline, zero-padded character array of `len` bytes.
pub fn parse_fixed_string(input: &mut &[u8], len: usize) -> WResult<String> {
    let bytes: &[u8] = take(len).parse_next(input)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

/// Convert an on-disk element count into a `usize`, rejecting negative values.
pub fn checked_count(file: FileKind, what: &str, count: i32) -> AssetResult<usize> {
    usize::try_from(count).map_err(|_| {
        Report::new(AssetError::invalid_body(
            file,
            format!("negative {what} count {count}"),
        ))
    })
}
