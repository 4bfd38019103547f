//! Offset pagination with a fixed page size.

pub const PAGE_SIZE: u64 = 10;

/// A 1-based page number.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct PageRequest(u64);

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u64) -> Self {
        Self(page.max(1))
    }

    /// Lenient parsing of a `page` query value: anything unusable means page 1.
    #[must_use]
    pub fn from_query(page: Option<&str>) -> Self {
        page.and_then(|page| page.trim().parse::<u64>().ok())
            .map(Self::new)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn number(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn offset(self) -> u64 {
        (self.0 - 1).saturating_mul(PAGE_SIZE)
    }

    #[must_use]
    pub fn limit(self) -> u64 {
        PAGE_SIZE
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn current_page(&self) -> u64 {
        self.request.number()
    }

    #[must_use]
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(PAGE_SIZE).max(1)
    }

    /// 1-based position of the first item, `None` on an empty page.
    #[must_use]
    pub fn from(&self) -> Option<u64> {
        (!self.items.is_empty()).then(|| self.request.offset() + 1)
    }

    #[must_use]
    pub fn to(&self) -> Option<u64> {
        (!self.items.is_empty()).then(|| self.request.offset() + self.items.len() as u64)
    }

    #[must_use]
    pub fn prev_page(&self) -> Option<u64> {
        (self.current_page() > 1).then(|| self.current_page() - 1)
    }

    #[must_use]
    pub fn next_page(&self) -> Option<u64> {
        (self.current_page() < self.last_page()).then(|| self.current_page() + 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total: self.total,
        }
    }
}
