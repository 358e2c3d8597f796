//! Free-text filtering and 1-based pagination shared by every table.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Something a table can search. Each table chooses which of its fields the search box matches.
pub trait Searchable {
    /// The values a free-text query is matched against.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

/// Returns true if `query` is a case-insensitive substring of any of `fields`. A blank query
/// matches everything.
pub fn matches_query<S>(fields: &[S], query: &str) -> bool
where
    S: AsRef<str>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.as_ref().to_lowercase().contains(&needle))
}

/// Keeps the items whose `fields` match `query`, preserving order.
pub fn filter_by<'a, T, F, S>(items: &'a [T], query: &str, fields: F) -> Vec<&'a T>
where
    F: Fn(&T) -> Vec<S>,
    S: AsRef<str>,
{
    items
        .iter()
        .filter(|item| matches_query(&fields(*item), query))
        .collect()
}

/// Keeps the items whose `Searchable::search_fields` match `query`, preserving order.
pub fn filter<'a, T>(items: &'a [T], query: &str) -> Vec<&'a T>
where
    T: Searchable,
{
    items
        .iter()
        .filter(|item| matches_query(&item.search_fields(), query))
        .collect()
}

/// The number of pages needed to show `total_count` items, `page_size` at a time.
pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Returns page `current_page` (1-based) of `items`. A page past the end, page 0, or a page size of
/// 0 gives an empty slice.
pub fn paginate<T>(items: &[T], current_page: usize, page_size: usize) -> &[T] {
    if current_page == 0 || page_size == 0 {
        return &[];
    }
    let start = (current_page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// One page of a table along with what is needed to render its pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page: usize,
    page_size: usize,
    total_count: usize,
    total_pages: usize,
}

impl<T> Page<T>
where
    T: Clone,
{
    /// Slices page `page` out of the already filtered and sorted `items`.
    pub fn new(items: &[T], page: usize, page_size: usize) -> Self {
        Self {
            items: paginate(items, page, page_size).to_vec(),
            page,
            page_size,
            total_count: items.len(),
            total_pages: total_pages(items.len(), page_size),
        }
    }
}

impl<T> Page<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// e.g. `Page 2 of 5 (93 items)`
    pub fn summary(&self) -> String {
        format!(
            "Page {} of {} ({} items)",
            self.page, self.total_pages, self.total_count
        )
    }
}
