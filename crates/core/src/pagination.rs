//! Pagination maths shared by every list endpoint.
//!
//! The window contract: `page` is 1-based and must be >= 1 when present
//! (a page below 1 is an input error, not something to clamp silently);
//! `limit` is clamped into `[1, MAX_PAGE_SIZE]`.

use serde::Serialize;

use crate::error::CoreError;

/// Page size applied when the caller does not send `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Hard ceiling for `limit`; larger values are clamped, not rejected.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Validated paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    /// Build a window from raw query values.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(CoreError::Validation(
                "El parámetro 'page' debe ser mayor o igual a 1".to_string(),
            ));
        }
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        Ok(Self { page, limit })
    }

    /// Row offset of the window's first row.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Number of pages needed for `total` rows at page size `limit`.
/// Zero rows means zero pages.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// One page of results plus the counters every list endpoint reports.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, params: PageParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            limit: params.limit,
            total_pages: total_pages(total, params.limit),
        }
    }
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse the API query value (`asc` / `desc`, case-insensitive).
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(CoreError::Validation(format!(
                "Orden inválido '{value}'. Valores permitidos: asc, desc"
            ))),
        }
    }

    /// SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // PageParams
    // -----------------------------------------------------------------------

    #[test]
    fn defaults_applied() {
        let params = PageParams::new(None, None).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_below_one_rejected() {
        assert!(PageParams::new(Some(0), None).is_err());
        assert!(PageParams::new(Some(-3), None).is_err());
    }

    #[test]
    fn limit_clamped_to_ceiling() {
        let params = PageParams::new(None, Some(5000)).unwrap();
        assert_eq!(params.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn limit_clamped_to_floor() {
        let params = PageParams::new(None, Some(0)).unwrap();
        assert_eq!(params.limit, 1);
        let params = PageParams::new(None, Some(-7)).unwrap();
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn offset_math() {
        let params = PageParams::new(Some(2), Some(10)).unwrap();
        assert_eq!(params.offset(), 10);
        let params = PageParams::new(Some(1), Some(25)).unwrap();
        assert_eq!(params.offset(), 0);
        let params = PageParams::new(Some(4), Some(7)).unwrap();
        assert_eq!(params.offset(), 21);
    }

    // -----------------------------------------------------------------------
    // total_pages
    // -----------------------------------------------------------------------

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn total_pages_exact_division() {
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(1, 1), 1);
    }

    #[test]
    fn total_pages_empty_set() {
        assert_eq!(total_pages(0, 10), 0);
    }

    // -----------------------------------------------------------------------
    // Page envelope
    // -----------------------------------------------------------------------

    #[test]
    fn page_envelope_counters() {
        let params = PageParams::new(Some(2), Some(10)).unwrap();
        let page = Page::new(vec![1, 2, 3], 25, params);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 3);
    }

    #[test]
    fn page_envelope_serializes_camel_case() {
        let params = PageParams::new(None, None).unwrap();
        let page = Page::new(Vec::<i64>::new(), 0, params);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("totalPages").is_some());
        assert!(json.get("total_pages").is_none());
    }

    // -----------------------------------------------------------------------
    // SortOrder
    // -----------------------------------------------------------------------

    #[test]
    fn sort_order_parses_case_insensitive() {
        assert_eq!(SortOrder::parse("asc").unwrap(), SortOrder::Asc);
        assert_eq!(SortOrder::parse("DESC").unwrap(), SortOrder::Desc);
    }

    #[test]
    fn sort_order_rejects_unknown() {
        assert!(SortOrder::parse("sideways").is_err());
    }

    #[test]
    fn sort_order_sql_keywords() {
        assert_eq!(SortOrder::Asc.as_sql(), "ASC");
        assert_eq!(SortOrder::Desc.as_sql(), "DESC");
    }
}
