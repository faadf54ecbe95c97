//! Pagination utilities for service layer
//!
//! `PageParams` carries the page/sort fields every list query shares. Values
//! bound from a request are kept as given and normalized on read, so an
//! out-of-range page or size is corrected rather than rejected.

use serde::Deserialize;

use crate::repository::{SortDirection, SortInstruction};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 50;
pub const DEFAULT_SORT_COLUMN: &str = "Id";

/// Page size bounds applied during normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl PageLimits {
    /// Clamp to sane values: max >= 1, default within `[1, max]`.
    pub fn new(default_page_size: u64, max_page_size: u64) -> Self {
        let max_page_size = max_page_size.max(1);
        let default_page_size = default_page_size.clamp(1, max_page_size);
        Self { default_page_size, max_page_size }
    }
}

impl Default for PageLimits {
    fn default() -> Self { Self { default_page_size: DEFAULT_PAGE_SIZE, max_page_size: MAX_PAGE_SIZE } }
}

impl From<&configs::PaginationConfig> for PageLimits {
    fn from(cfg: &configs::PaginationConfig) -> Self {
        Self::new(cfg.default_page_size, cfg.max_page_size)
    }
}

/// Pagination and sort parameters, bound from `pageNumber`, `pageSize`,
/// `sortColumn` and `sortDir`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageParams {
    page_number: i64,
    page_size: i64,
    sort_column: String,
    #[serde(rename = "sortDir", alias = "sortDirection")]
    sort_direction: SortDirection,
    #[serde(skip)]
    limits: PageLimits,
}

impl Default for PageParams {
    fn default() -> Self {
        let limits = PageLimits::default();
        Self {
            page_number: 1,
            page_size: limits.default_page_size as i64,
            sort_column: DEFAULT_SORT_COLUMN.to_string(),
            sort_direction: SortDirection::default(),
            limits,
        }
    }
}

impl PageParams {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self { page_number, page_size, ..Self::default() }
    }

    pub fn sorted_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.sort_column = column.to_string();
        self.sort_direction = direction;
        self
    }

    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// 1-based page number; anything <= 0 becomes 1.
    pub fn page_number(&self) -> u64 {
        if self.page_number <= 0 { 1 } else { self.page_number as u64 }
    }

    /// Page size in `[1, max]`; anything outside falls back to the default.
    pub fn page_size(&self) -> u64 {
        if self.page_size <= 0 || self.page_size as u64 > self.limits.max_page_size {
            self.limits.default_page_size
        } else {
            self.page_size as u64
        }
    }

    /// `None` when the sort column is blank.
    pub fn sort_instruction(&self) -> Option<SortInstruction> {
        let column = self.sort_column.trim();
        if column.is_empty() {
            return None;
        }
        Some(SortInstruction::new(column, self.sort_direction))
    }
}

/// Zero-based offset of the first row on 1-based page `page_number`.
/// Saturates instead of overflowing for absurd page numbers.
pub fn page_offset(page_number: u64, page_size: u64) -> u64 {
    page_number.max(1).saturating_sub(1).saturating_mul(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_non_positive_page_number_to_one() {
        for n in [0, -1, -500, i64::MIN] {
            assert_eq!(PageParams::new(n, 10).page_number(), 1);
        }
        assert_eq!(PageParams::new(7, 10).page_number(), 7);
    }

    #[test]
    fn normalize_out_of_range_page_size_to_default() {
        for size in [0, -3, 51, 1000, i64::MAX] {
            assert_eq!(PageParams::new(1, size).page_size(), DEFAULT_PAGE_SIZE);
        }
        assert_eq!(PageParams::new(1, 1).page_size(), 1);
        assert_eq!(PageParams::new(1, 50).page_size(), 50);
    }

    #[test]
    fn custom_limits_apply() {
        let p = PageParams::new(1, 80).with_limits(PageLimits::new(25, 100));
        assert_eq!(p.page_size(), 80);
        let p = PageParams::new(1, 101).with_limits(PageLimits::new(25, 100));
        assert_eq!(p.page_size(), 25);
    }

    #[test]
    fn limits_are_clamped() {
        let l = PageLimits::new(0, 0);
        assert_eq!(l, PageLimits { default_page_size: 1, max_page_size: 1 });
        let l = PageLimits::new(500, 50);
        assert_eq!(l.default_page_size, 50);
    }

    #[test]
    fn default_values_are_sane() {
        let d = PageParams::default();
        assert_eq!(d.page_number(), 1);
        assert_eq!(d.page_size(), 10);
        let sort = d.sort_instruction().unwrap();
        assert_eq!(sort.column, "Id");
        assert_eq!(sort.direction, SortDirection::Descending);
    }

    #[test]
    fn blank_sort_column_yields_no_instruction() {
        let p = PageParams::default().sorted_by("   ", SortDirection::Ascending);
        assert!(p.sort_instruction().is_none());
    }

    #[test]
    fn binds_from_query_string_names() {
        let p: PageParams =
            serde_json::from_str(r#"{"pageNumber":0,"pageSize":1000,"sortColumn":"name","sortDir":"asc"}"#).unwrap();
        assert_eq!(p.page_number(), 1);
        assert_eq!(p.page_size(), 10);
        assert_eq!(p.sort_instruction(), Some(SortInstruction::new("name", SortDirection::Ascending)));
        assert_eq!(page_offset(p.page_number(), p.page_size()), 0);
    }

    #[test]
    fn offset_counts_whole_pages() {
        let p = PageParams::new(3, 20);
        assert_eq!(page_offset(p.page_number(), p.page_size()), 40);
        assert_eq!(page_offset(0, 20), 0);
        assert_eq!(page_offset(u64::MAX, 50), u64::MAX);
    }
}
