//! Sort expressions from the query string
//!
//! `?sort=name,-created_at,+id` sorts by `name` ascending, then `created_at`
//! descending, then `id` ascending. Sorting is optional: a missing or empty
//! parameter yields no sort fields and never an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::SortBinder;
use crate::error::HttpError;
use crate::query::QueryParams;

/// Query key holding the sort expression
pub const SORT_PARAM: &str = "sort";

/// Sort direction
///
/// # Example
///
/// ```rust
/// use http_binder::SortDirection;
///
/// assert_eq!(format!("{}", SortDirection::Asc), "asc");
/// assert_eq!(SortDirection::Desc.as_sql(), "DESC");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending (A-Z, 0-9, oldest first)
    #[default]
    Asc,
    /// Descending (Z-A, 9-0, newest first)
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl SortDirection {
    /// SQL `ORDER BY` keyword
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A field to sort by, with its direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Field name
    pub field: String,
    /// Direction
    pub direction: SortDirection,
}

impl SortField {
    /// Ascending sort on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parse the `sort` parameter, primary key first
///
/// # Example
///
/// ```rust
/// use http_binder::{parse_sort, QueryParams, SortField};
///
/// let fields = parse_sort(&QueryParams::parse("sort=name,-age"));
/// assert_eq!(fields, vec![SortField::asc("name"), SortField::desc("age")]);
///
/// assert!(parse_sort(&QueryParams::parse("sort=")).is_empty());
/// ```
#[must_use]
pub fn parse_sort(params: &QueryParams) -> Vec<SortField> {
    let Some(expr) = params.get_non_empty(SORT_PARAM) else {
        return Vec::new();
    };

    expr.split(',')
        .map(str::trim)
        .filter_map(|token| {
            let field = match token.as_bytes().first() {
                Some(b'-') => SortField::desc(&token[1..]),
                Some(b'+') => SortField::asc(&token[1..]),
                Some(_) => SortField::asc(token),
                None => return None,
            };
            // a bare sign names no field
            (!field.field.is_empty()).then_some(field)
        })
        .collect()
}

/// Sort bundle for request types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortParams {
    /// Parsed sort fields, primary key first
    pub fields: Vec<SortField>,
}

impl SortParams {
    /// Whether any sort was requested
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The primary sort field
    #[must_use]
    pub fn primary(&self) -> Option<&SortField> {
        self.fields.first()
    }
}

impl SortBinder for SortParams {
    fn bind_sort(&mut self, params: &QueryParams) -> Result<(), HttpError> {
        self.fields = parse_sort(params);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sort(expr: &str) -> Vec<SortField> {
        let params: QueryParams = [("sort", expr)].into_iter().collect();
        parse_sort(&params)
    }

    #[test]
    fn test_sort_direction_default() {
        assert_eq!(SortDirection::default(), SortDirection::Asc);
    }

    #[test]
    fn test_sort_direction_serde() {
        let desc: SortDirection = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(desc, SortDirection::Desc);
        assert_eq!(serde_json::to_string(&SortDirection::Asc).unwrap(), "\"asc\"");
    }

    #[test]
    fn test_mixed_directions_keep_order() {
        assert_eq!(
            sort("name,-age"),
            vec![SortField::asc("name"), SortField::desc("age")]
        );
    }

    #[test]
    fn test_plus_prefix_is_ascending() {
        assert_eq!(sort("+id"), vec![SortField::asc("id")]);
    }

    #[test]
    fn test_tokens_are_trimmed_and_empties_dropped() {
        assert_eq!(
            sort(" name , ,-created_at,,"),
            vec![SortField::asc("name"), SortField::desc("created_at")]
        );
    }

    #[test]
    fn test_bare_signs_are_dropped() {
        assert_eq!(sort("-,+,name"), vec![SortField::asc("name")]);
    }

    #[test]
    fn test_empty_and_missing() {
        assert!(sort("").is_empty());
        assert!(parse_sort(&QueryParams::new()).is_empty());
    }

    #[test]
    fn test_sort_params_binder() {
        let mut params = SortParams::default();
        let query: QueryParams = [("sort", "-score")].into_iter().collect();
        params.bind_sort(&query).unwrap();
        assert_eq!(params.primary(), Some(&SortField::desc("score")));
    }
}
