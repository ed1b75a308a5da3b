//! Field selection for partial updates
//!
//! A PATCH request names the fields it updates in the query string
//! (`PATCH /users/42?fields=name,email`). Only those fields should be copied
//! from the decoded body onto the stored entity.

use serde::{Deserialize, Serialize};

use crate::capability::PatchFieldExtractor;
use crate::error::HttpError;
use crate::query::QueryParams;

/// Query key listing the fields to update
pub const FIELDS_PARAM: &str = "fields";

/// Parse the `fields` selection of a PATCH request
///
/// # Example
///
/// ```rust
/// use http_binder::{extract_patch_fields, QueryParams};
///
/// let fields = extract_patch_fields(&QueryParams::parse("fields=name,%20email")).unwrap();
/// assert_eq!(fields, ["name", "email"]);
///
/// assert!(extract_patch_fields(&QueryParams::new()).is_err());
/// ```
pub fn extract_patch_fields(params: &QueryParams) -> Result<Vec<String>, HttpError> {
    let raw = params.get_non_empty(FIELDS_PARAM).ok_or_else(|| {
        HttpError::bad_request("'fields' query parameter is required for PATCH requests")
    })?;

    let fields: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect();

    if fields.is_empty() {
        return Err(HttpError::bad_request(
            "at least one field must be specified for update",
        ));
    }

    Ok(fields)
}

/// Patch field bundle for request types
///
/// Holds the selection in request order. Embed it with `#[serde(skip)]` so the
/// body cannot supply it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchFields {
    /// Fields to update, in the order given
    pub fields: Vec<String>,
}

impl PatchFields {
    /// Whether `field` was selected for update
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Iterate the selected fields
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

impl PatchFieldExtractor for PatchFields {
    fn extract_patch_fields(&mut self, params: &QueryParams) -> Result<(), HttpError> {
        self.fields = extract_patch_fields(params)?;
        Ok(())
    }
}
