use serde::{Deserialize, Serialize};
use crate::status::ListStatus;

/// Pagination options for fetching a whole list. `page` is 1-indexed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl ListEntriesQuery {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self { page, per_page }
    }

    /// Slice `entries` to the requested page.
    ///
    /// Returns the list untouched unless both `page` and `per_page` are set.
    /// Out-of-range pages come back empty; page 0 is always empty.
    pub fn paginate<T>(&self, entries: Vec<T>) -> Vec<T> {
        let (Some(page), Some(per_page)) = (self.page, self.per_page) else {
            return entries;
        };

        let per_page = per_page as usize;
        let start = per_page.saturating_mul((page as usize).saturating_sub(1));
        let end = per_page.saturating_mul(page as usize).min(entries.len());

        if start >= end {
            return Vec::new();
        }

        entries.into_iter().skip(start).take(end - start).collect()
    }
}

/// Values written by a combined list entry edit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditListEntryOptions {
    /// 0-100 scale; left untouched when absent
    #[serde(default)]
    pub score: Option<u32>,
    pub progress: u32,
    pub status: ListStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: u32) -> Vec<u32> {
        (0..n).collect()
    }

    #[test]
    fn test_paginate_second_page() {
        let query = ListEntriesQuery::new(Some(2), Some(10));
        let page = query.paginate(numbers(35));
        assert_eq!(page, (10..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_paginate_partial_last_page() {
        let query = ListEntriesQuery::new(Some(4), Some(10));
        assert_eq!(query.paginate(numbers(35)), vec![30, 31, 32, 33, 34]);
    }

    #[test]
    fn test_paginate_past_end_is_empty() {
        let query = ListEntriesQuery::new(Some(5), Some(10));
        assert!(query.paginate(numbers(35)).is_empty());
    }

    #[test]
    fn test_paginate_requires_both_options() {
        assert_eq!(ListEntriesQuery::new(Some(2), None).paginate(numbers(5)).len(), 5);
        assert_eq!(ListEntriesQuery::new(None, Some(2)).paginate(numbers(5)).len(), 5);
        assert_eq!(ListEntriesQuery::default().paginate(numbers(5)).len(), 5);
    }

    #[test]
    fn test_paginate_page_zero_is_empty() {
        let query = ListEntriesQuery::new(Some(0), Some(10));
        assert!(query.paginate(numbers(35)).is_empty());
    }

    #[test]
    fn test_query_deserializes_camel_case() {
        let query: ListEntriesQuery = serde_json::from_str(r#"{"page": 3, "perPage": 25}"#).unwrap();
        assert_eq!(query, ListEntriesQuery::new(Some(3), Some(25)));
    }
}
