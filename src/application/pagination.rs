//! Offset pagination over in-memory result sets.

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl PageRequest {
    /// Missing or zero values fall back to the defaults. Anything else is clamped: the page
    /// to at least 1 and the size to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page
            .filter(|page| *page != 0)
            .map_or(1, |page| page.clamp(1, i64::from(u32::MAX)) as u32);
        let page_size = page_size
            .filter(|size| *size != 0)
            .map_or(DEFAULT_PAGE_SIZE, |size| {
                size.clamp(1, i64::from(MAX_PAGE_SIZE)) as u32
            });
        Self { page, page_size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }

    /// Slice `items` to this page. Pages past the end are empty.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Paginated<T> {
        let total_items = items.len() as u64;
        let total_pages = total_items.div_ceil(u64::from(self.page_size));
        let page_items = items
            .iter()
            .skip(self.offset())
            .take(self.page_size as usize)
            .cloned()
            .collect();

        Paginated {
            items: page_items,
            meta: PageMeta {
                page: self.page,
                page_size: self.page_size,
                total_items,
                total_pages,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}
