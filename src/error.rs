use std::fmt;

use rootcause::Report;
use thiserror::Error;

/// Which of the three files of a model an error was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FileKind {
    /// `.mdl` descriptor file.
    Model,
    /// `.vvd` vertex file.
    Vertex,
    /// `.vtx` strip file.
    Strip,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileKind::Model => "model",
            FileKind::Vertex => "vertex",
            FileKind::Strip => "strip",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone)]
pub enum AssetError {
    #[error("{file} file has an invalid identifier: expected 0x{expected:08X}, found 0x{found:08X}")]
    InvalidHeader {
        file: FileKind,
        expected: u32,
        found: u32,
    },
    #[error("{file} file version {version} is unsupported (supported: {supported})")]
    UnsupportedVersion {
        file: FileKind,
        version: i32,
        supported: i32,
    },
    #[error("{file} file {field} mismatch: expected {expected}, found {found}")]
    InvalidChecksum {
        file: FileKind,
        field: &'static str,
        expected: i32,
        found: i32,
    },
    #[error("{file} file body is invalid: {reason}")]
    InvalidBody { file: FileKind, reason: String },
    #[error("out of bounds access: need {need} bytes at offset 0x{offset:X}, have {have}")]
    OutOfBoundsAccess {
        offset: i64,
        need: usize,
        have: usize,
    },
    #[error("cannot walk {what} pairwise: {left} vs {right} entries")]
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },
}

impl AssetError {
    pub(crate) fn out_of_bounds(offset: i64, need: usize, have: usize) -> Self {
        AssetError::OutOfBoundsAccess {
            offset,
            need,
            have,
        }
    }

    pub(crate) fn invalid_body(file: FileKind, reason: impl Into<String>) -> Self {
        AssetError::InvalidBody {
            file,
            reason: reason.into(),
        }
    }
}

pub type AssetResult<T> = Result<T, Report<AssetError>>;
