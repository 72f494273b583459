//! Offset pagination helpers.

use serde::Serialize;

use crate::domain::listing::MovieQuery;

/// One page of an offset-paginated listing along with the unpaginated total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> OffsetPage<T> {
    pub fn new(items: Vec<T>, total: u64, query: &MovieQuery) -> Self {
        Self {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> OffsetPage<U> {
        OffsetPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Clamp a computed offset into the range a SQL bind parameter accepts.
///
/// Offsets past `i64::MAX` cannot match any row, so they saturate.
pub fn sql_offset(query: &MovieQuery) -> i64 {
    i64::try_from(query.offset()).unwrap_or(i64::MAX)
}
