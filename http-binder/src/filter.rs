//! Filter expressions from the query string
//!
//! Filters are written as `filter.<field>=<value>` (equality) or
//! `filter.<field>[<operator>]=<value>`:
//!
//! ```text
//! ?filter.status=active
//! ?filter.age[gte]=18
//! ?filter.role[in]=admin,owner
//! ?filter.deleted_at[is_null]=
//! ```
//!
//! Conditions are meant to be combined with AND by the consumer, so their
//! relative order carries no meaning beyond following the query's key order.
//!
//! # Example
//!
//! ```rust
//! use http_binder::{parse_filters, FilterOperator, FilterValue, QueryParams};
//!
//! let params = QueryParams::parse("filter.status%5Bin%5D=a,b,%20c");
//! let conditions = parse_filters(&params).unwrap();
//!
//! assert_eq!(conditions[0].field, "status");
//! assert_eq!(conditions[0].operator, FilterOperator::In);
//! assert_eq!(conditions[0].values(), ["a", "b", "c"]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::capability::FilterBinder;
use crate::error::HttpError;
use crate::query::QueryParams;

/// Prefix marking a query key as a filter
pub const FILTER_PREFIX: &str = "filter.";

/// Comparison operator of a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Equal
    #[default]
    Eq,
    /// Not equal
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// In list
    In,
    /// Not in list
    NotIn,
    /// Contains substring
    Contains,
    /// Starts with
    Prefix,
    /// Ends with
    Suffix,
    /// Is null
    IsNull,
    /// Is not null
    NotNull,
}

/// How many values an operator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorArity {
    /// No value (`is_null`, `not_null`)
    Nullary,
    /// Exactly one value
    Single,
    /// One or more values (`in`, `not_in`)
    Multi,
}

impl FilterOperator {
    /// The wire token for this operator
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Contains => "contains",
            Self::Prefix => "prefix",
            Self::Suffix => "suffix",
            Self::IsNull => "is_null",
            Self::NotNull => "not_null",
        }
    }

    /// Number of values the operator expects
    #[must_use]
    pub const fn arity(&self) -> OperatorArity {
        match self {
            Self::IsNull | Self::NotNull => OperatorArity::Nullary,
            Self::In | Self::NotIn => OperatorArity::Multi,
            _ => OperatorArity::Single,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an operator token is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported operator '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for FilterOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            "contains" => Self::Contains,
            "prefix" => Self::Prefix,
            "suffix" => Self::Suffix,
            "is_null" => Self::IsNull,
            "not_null" => Self::NotNull,
            other => return Err(UnknownOperator(other.to_string())),
        })
    }
}

/// Value payload of a filter condition, shaped by the operator's arity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// `is_null` / `not_null`
    None,
    /// Single-value operators
    Single(String),
    /// `in` / `not_in`; never empty
    Multi(Vec<String>),
}

/// One parsed filter condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    /// Field being filtered
    pub field: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// Operand(s)
    pub value: FilterValue,
}

impl FilterCondition {
    /// The single operand, if the operator takes one
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match &self.value {
            FilterValue::Single(value) => Some(value),
            _ => None,
        }
    }

    /// The operand list; empty unless the operator is `in` / `not_in`
    #[must_use]
    pub fn values(&self) -> &[String] {
        match &self.value {
            FilterValue::Multi(values) => values,
            _ => &[],
        }
    }
}

/// Parse every `filter.*` key of the query into conditions
///
/// Keys without the prefix are ignored. Fails with a 400 on an unknown
/// operator, an empty field name, a malformed bracket, or a missing value.
pub fn parse_filters(params: &QueryParams) -> Result<Vec<FilterCondition>, HttpError> {
    let mut conditions = Vec::new();

    for (key, raw_values) in params.iter() {
        let Some(filter_key) = key.strip_prefix(FILTER_PREFIX) else {
            continue;
        };

        let (field, operator) = parse_filter_key(filter_key).map_err(|reason| {
            HttpError::bad_request(format!("invalid filter key '{key}': {reason}"))
        })?;

        if raw_values.is_empty() {
            continue;
        }

        let value = match operator.arity() {
            OperatorArity::Nullary => FilterValue::None,
            OperatorArity::Multi => {
                let values: Vec<String> = raw_values
                    .iter()
                    .flat_map(|raw| raw.split(','))
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                if values.is_empty() {
                    return Err(HttpError::bad_request(format!(
                        "filter '{key}' requires at least one value"
                    )));
                }
                FilterValue::Multi(values)
            }
            OperatorArity::Single => {
                let value = raw_values[0].trim();
                if value.is_empty() {
                    return Err(HttpError::bad_request(format!(
                        "filter '{key}' requires a value"
                    )));
                }
                FilterValue::Single(value.to_string())
            }
        };

        conditions.push(FilterCondition {
            field: field.to_string(),
            operator,
            value,
        });
    }

    Ok(conditions)
}

/// Split `field` or `field[op]` into its parts
fn parse_filter_key(filter_key: &str) -> Result<(&str, FilterOperator), String> {
    let (field, operator) = match filter_key.split_once('[') {
        Some((field, rest)) => {
            let op = rest
                .strip_suffix(']')
                .ok_or_else(|| "invalid filter format".to_string())?;
            let operator = op.parse::<FilterOperator>().map_err(|e| e.to_string())?;
            (field, operator)
        }
        None => (filter_key, FilterOperator::Eq),
    };

    if field.is_empty() {
        return Err("field name cannot be empty".to_string());
    }

    Ok((field, operator))
}

/// Filter bundle for request types
///
/// Embed it and return it from
/// [`Bindable::filter_binder`](crate::Bindable::filter_binder).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Parsed conditions, replaced on every bind
    pub conditions: Vec<FilterCondition>,
}

impl FilterParams {
    /// Conditions on a given field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FilterCondition> {
        self.conditions.iter().filter(move |c| c.field == field)
    }

    /// Whether any condition was supplied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl FilterBinder for FilterParams {
    fn bind_filters(&mut self, params: &QueryParams) -> Result<(), HttpError> {
        self.conditions = parse_filters(params)?;
        Ok(())
    }
}
