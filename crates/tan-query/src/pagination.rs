//! Pagination envelope.

use serde::{Deserialize, Serialize};

/// Counts for one served page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    /// `ceil(total / limit)`; 0 when nothing matched.
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(page: i64, limit: i64, total: u64) -> Self {
        let limit_u = limit.max(1) as u64;
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit_u),
        }
    }
}

/// Navigation links for one served page. `prev`/`next` are absent at
/// the boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub first: String,
    pub last: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PageLinks {
    /// Build links relative to `base` (the endpoint path).
    pub fn build(base: &str, meta: &PageMeta) -> Self {
        let link = |page: i64| format!("{base}?page={page}&limit={limit}", limit = meta.limit);
        // An empty result set still gets well-formed first/last links.
        let last_page = meta.total_pages.max(1) as i64;
        Self {
            self_link: link(meta.page),
            first: link(1),
            last: link(last_page),
            prev: (meta.page > 1).then(|| link(meta.page - 1)),
            next: (meta.page < last_page).then(|| link(meta.page + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(PageMeta::new(1, 10, 0).total_pages, 0);
        assert_eq!(PageMeta::new(1, 10, 10).total_pages, 1);
        assert_eq!(PageMeta::new(1, 10, 11).total_pages, 2);
        assert_eq!(PageMeta::new(1, 1000, 4999).total_pages, 5);
    }

    #[test]
    fn test_links_absent_at_boundaries() {
        let meta = PageMeta::new(1, 10, 35);
        let links = PageLinks::build("/api/assets", &meta);
        assert_eq!(links.self_link, "/api/assets?page=1&limit=10");
        assert!(links.prev.is_none());
        assert_eq!(links.next.as_deref(), Some("/api/assets?page=2&limit=10"));
        assert_eq!(links.last, "/api/assets?page=4&limit=10");

        let meta = PageMeta::new(4, 10, 35);
        let links = PageLinks::build("/api/assets", &meta);
        assert_eq!(links.prev.as_deref(), Some("/api/assets?page=3&limit=10"));
        assert!(links.next.is_none());
    }

    #[test]
    fn test_empty_result_still_has_well_formed_links() {
        let meta = PageMeta::new(1, 10, 0);
        let links = PageLinks::build("/api/assets", &meta);
        assert_eq!(links.first, links.last);
        assert!(links.prev.is_none());
        assert!(links.next.is_none());
    }
}
