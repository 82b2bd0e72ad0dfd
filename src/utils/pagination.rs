use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized page window. Construct through [`PageRequest::new`] so the
/// defaulting rules always apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// `page < 1` becomes 1, `page_size < 1` becomes 10, `page_size > 100` becomes 100.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let page_size = match page_size {
            Some(s) if s >= 1 => s.min(MAX_PAGE_SIZE as i64) as u32,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    pub fn limit(&self) -> u64 {
        self.page_size as u64
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    pub fn metadata(&self, total_items: i64) -> PaginationMetadata {
        PaginationMetadata {
            current_page: self.page,
            page_size: self.page_size,
            total_pages: total_pages(total_items, self.page_size),
            total_items,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// `ceil(total / page_size)`; zero items means zero pages.
pub fn total_pages(total_items: i64, page_size: u32) -> u32 {
    if total_items <= 0 || page_size == 0 {
        return 0;
    }
    let size = page_size as i64;
    ((total_items + size - 1) / size) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMetadata {
    #[schema(example = 1)]
    pub current_page: u32,
    #[schema(example = 10)]
    pub page_size: u32,
    #[schema(example = 3)]
    pub total_pages: u32,
    #[schema(example = 27)]
    pub total_items: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}
