//! Bounds-checked, offset-addressed reads over an untrusted byte buffer.
//!
//! Every structured read in the crate goes through [`OffsetView`]. A view is a
//! borrowed buffer plus a base position; all offsets handed to it are relative
//! to that base and validated against the buffer length before any bytes are
//! decoded. Walking a hierarchy re-bases the view at each parsed record so that
//! child offsets, which the formats store relative to the declaring record, can
//! be passed through unchanged.

use rootcause::Report;

use crate::data::parser_utils::Record;
use crate::error::{AssetError, AssetResult};

#[derive(Debug, Clone, Copy)]
pub struct OffsetView<'a> {
    data: &'a [u8],
    base: usize,
}

/// A decoded record together with a view based at the record's own address.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a, T> {
    pub record: T,
    pub view: OffsetView<'a>,
}

impl<'a> OffsetView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, base: 0 }
    }

    /// Absolute position of this view's base within the buffer.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Length of the whole underlying buffer.
    pub fn buffer_len(&self) -> usize {
        self.data.len()
    }

    /// Resolve `relative` against the base and check that `need` bytes fit.
    fn resolve(&self, relative: i64, need: usize) -> AssetResult<usize> {
        let have = self.data.len();
        let absolute = (self.base as i64).saturating_add(relative);
        if relative < 0 {
            return Err(Report::new(AssetError::out_of_bounds(absolute, need, have)));
        }

        let start = usize::try_from(relative)
            .ok()
            .and_then(|relative| self.base.checked_add(relative));
        match start {
            Some(start) if start.checked_add(need).is_some_and(|end| end <= have) => Ok(start),
            _ => Err(Report::new(AssetError::out_of_bounds(absolute, need, have))),
        }
    }

    /// New view whose base is `relative` bytes past this one.
    pub fn with_offset(&self, relative: impl Into<i64>) -> AssetResult<OffsetView<'a>> {
        let base = self.resolve(relative.into(), 0)?;
        Ok(OffsetView {
            data: self.data,
            base,
        })
    }

    pub fn parse_record<T: Record>(&self, relative: impl Into<i64>) -> AssetResult<T> {
        let relative = relative.into();
        let start = self.resolve(relative, T::SIZE)?;
        let input = &mut &self.data[start..start + T::SIZE];
        T::parse(input).map_err(|_| {
            Report::new(AssetError::out_of_bounds(
                start as i64,
                T::SIZE,
                self.data.len(),
            ))
        })
    }

    /// Like [`Self::parse_record`], also returning a view based at the record.
    pub fn parse_located<T: Record>(&self, relative: impl Into<i64>) -> AssetResult<Located<'a, T>> {
        let view = self.with_offset(relative)?;
        let record = view.parse_record::<T>(0)?;
        Ok(Located { record, view })
    }

    /// Parse `count` consecutive records. A zero count never touches `relative`.
    pub fn parse_array<T: Record>(
        &self,
        relative: impl Into<i64>,
        count: usize,
    ) -> AssetResult<Vec<T>> {
        Ok(self
            .parse_located_array::<T>(relative, count)?
            .into_iter()
            .map(|located| located.record)
            .collect())
    }

    /// Parse `count` consecutive records, each paired with a view based at it.
    pub fn parse_located_array<T: Record>(
        &self,
        relative: impl Into<i64>,
        count: usize,
    ) -> AssetResult<Vec<Located<'a, T>>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let relative = relative.into();
        let need = T::SIZE.checked_mul(count).ok_or_else(|| {
            Report::new(AssetError::out_of_bounds(
                (self.base as i64).saturating_add(relative),
                usize::MAX,
                self.data.len(),
            ))
        })?;
        let start = self.resolve(relative, need)?;

        let mut records = Vec::with_capacity(count);
        for i in 0..count {
            let view = OffsetView {
                data: self.data,
                base: start + i * T::SIZE,
            };
            let record = view.parse_record::<T>(0)?;
            records.push(Located { record, view });
        }
        Ok(records)
    }

    /// Read a zero-terminated string starting `relative` bytes past the base.
    pub fn parse_string(&self, relative: impl Into<i64>) -> AssetResult<String> {
        let relative = relative.into();
        let start = self.resolve(relative, 0)?;
        let remaining = &self.data[start..];
        match remaining.iter().position(|&b| b == 0) {
            Some(end) => Ok(String::from_utf8_lossy(&remaining[..end]).into_owned()),
            None => Err(Report::new(AssetError::out_of_bounds(
                start as i64,
                remaining.len() + 1,
                self.data.len(),
            ))),
        }
    }
}
