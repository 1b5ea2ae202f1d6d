use std::borrow::Cow;

use crate::types::{MessageTemplate, UnmatchedGroup};

/// Anything that can be searched by a display name.
pub trait Named {
    fn display_name(&self) -> Cow<'_, str>;
}

impl Named for UnmatchedGroup {
    fn display_name(&self) -> Cow<'_, str> {
        UnmatchedGroup::display_name(self)
    }
}

impl Named for MessageTemplate {
    fn display_name(&self) -> Cow<'_, str> {
        MessageTemplate::display_name(self)
    }
}

/// Case-insensitive substring search. An empty query keeps everything.
pub fn filter_by_name<'a, T: Named>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let query = query.trim().to_lowercase();
    items
        .iter()
        .filter(|item| query.is_empty() || item.display_name().to_lowercase().contains(&query))
        .collect()
}

/// One page of a client-side paginated list. Pages are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<'a, T> Page<'a, T> {
    /// 1-based position of the first item on this page, for serial numbering.
    pub fn first_serial(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size + 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slices `items` for `page`. Out-of-range pages (including 0) come back empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let slice = if page == 0 || page > total_pages {
        &items[0..0]
    } else {
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total_items);
        &items[start..end]
    };

    Page {
        items: slice,
        page,
        page_size,
        total_items,
        total_pages,
    }
}
