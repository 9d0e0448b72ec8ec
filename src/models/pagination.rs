//! Paging and sorting primitives

use serde::Serialize;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// One page of results plus the metadata derived from the total count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    /// Number of matches before pagination
    pub total_count: i64,
    pub page_number: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PagedResult<T> {
    /// `page_size` must be positive.
    pub fn new(items: Vec<T>, total_count: i64, page_number: i64, page_size: i64) -> Self {
        let total_pages = total_pages(total_count, page_size);
        Self {
            items,
            total_count,
            page_number,
            page_size,
            total_pages,
            has_previous_page: page_number > 1,
            has_next_page: page_number < total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

/// `ceil(total_count / page_size)`
pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if total_count <= 0 {
        return 0;
    }
    (total_count + page_size - 1) / page_size
}

/// Rows to skip before the requested page, clamped at `i64::MAX` for pages far past the end
pub fn page_offset(page_number: i64, page_size: i64) -> i64 {
    page_number.saturating_sub(1).saturating_mul(page_size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// "DESC" in any case is descending; everything else, including absent, is ascending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}
