use serde::{Deserialize, Serialize};

pub(crate) const fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    pub(crate) skip: usize,
    #[serde(default = "default_limit")]
    pub(crate) limit: usize,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { skip: 0, limit: default_limit() }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: usize,
    pub(crate) skip: usize,
    pub(crate) limit: usize,
}

impl<T> PaginatedResponse<T> {
    /// Applies the window to an already-filtered, in-memory listing.
    pub(crate) fn paginate(mut items: Vec<T>, page: &PageQuery) -> Self {
        let total_count = items.len();
        let start = page.skip.min(total_count);
        let end = start.saturating_add(page.limit).min(total_count);
        let items = items.drain(start..end).collect();
        Self { items, total_count, skip: page.skip, limit: page.limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_clamped_to_the_listing() {
        let page = PageQuery { skip: 2, limit: 2 };
        let result = PaginatedResponse::paginate(vec![1, 2, 3, 4, 5], &page);
        assert_eq!(result.items, vec![3, 4]);
        assert_eq!(result.total_count, 5);

        let page = PageQuery { skip: 10, limit: 5 };
        let result = PaginatedResponse::paginate(vec![1, 2, 3], &page);
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 3);
    }
}
