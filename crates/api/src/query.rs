//! Shared query parameter helpers for list endpoints.
//!
//! Every paginated listing accepts `?page=&limit=&sortBy=&sortOrder=` on top
//! of its own filters. The paging window is validated by
//! `peritos_core::pagination::PageParams`; sort resolution lives here because
//! it needs the per-resource column whitelist from the model layer.

use peritos_core::error::CoreError;
use peritos_core::pagination::SortOrder;

use crate::error::AppError;

/// Resolve the `sortBy`/`sortOrder` pair against a resource's column
/// whitelist.
///
/// `map` is the model's whitelist function (camelCase API field to column
/// name). Unknown fields and orders are validation errors; caller input never
/// reaches the SQL string.
pub fn sort_spec(
    sort_by: Option<&str>,
    sort_order: Option<&str>,
    default_column: &'static str,
    map: fn(&str) -> Option<&'static str>,
) -> Result<(&'static str, SortOrder), AppError> {
    let column = match sort_by {
        None => default_column,
        Some(field) => map(field).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Campo de ordenamiento inválido '{field}'"
            )))
        })?,
    };

    let order = match sort_order {
        None => SortOrder::default(),
        Some(raw) => SortOrder::parse(raw)?,
    };

    Ok((column, order))
}
