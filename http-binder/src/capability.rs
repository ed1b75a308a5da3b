//! Binding capabilities a request type may opt into
//!
//! Each trait describes one independent way of populating a request object
//! from an incoming HTTP request. A request type implements [`Bindable`] and
//! exposes the capabilities it supports; every accessor defaults to `None`,
//! so an unimplemented capability is simply skipped by the binder.
//!
//! Capabilities are usually provided by embedding a bundle
//! ([`IdParam`](crate::IdParam), [`PaginatedList`](crate::PaginatedList),
//! [`SortParams`](crate::SortParams), [`FilterParams`](crate::FilterParams),
//! [`PatchFields`](crate::PatchFields)) as a field and forwarding to it.
//!
//! # Example
//!
//! ```rust
//! use http_binder::{Bindable, FilterBinder, FilterParams, SortBinder, SortParams};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct ListOrders {
//!     #[serde(skip)]
//!     sort: SortParams,
//!     #[serde(skip)]
//!     filters: FilterParams,
//! }
//!
//! impl Bindable for ListOrders {
//!     fn sort_binder(&mut self) -> Option<&mut dyn SortBinder> {
//!         Some(&mut self.sort)
//!     }
//!
//!     fn filter_binder(&mut self) -> Option<&mut dyn FilterBinder> {
//!         Some(&mut self.filters)
//!     }
//! }
//! ```

use crate::error::HttpError;
use crate::query::QueryParams;

/// Binds a single named route (path) parameter
pub trait RouteParamBinder {
    /// Name of the path parameter to read, e.g. `"id"` for `/users/{id}`
    fn route_param_name(&self) -> &str;

    /// Store the (non-empty) path value
    fn bind_route_param(&mut self, value: &str);
}

/// Binds arbitrary query parameters on GET requests
pub trait QueryParamBinder {
    /// Populate fields from the query string
    fn bind_query_params(&mut self, params: &QueryParams) -> Result<(), HttpError>;
}

/// Binds `filter.<field>[<op>]` conditions on GET requests
pub trait FilterBinder {
    /// Parse and store filter conditions
    fn bind_filters(&mut self, params: &QueryParams) -> Result<(), HttpError>;
}

/// Binds the `sort` expression on GET requests
pub trait SortBinder {
    /// Parse and store sort fields
    fn bind_sort(&mut self, params: &QueryParams) -> Result<(), HttpError>;
}

/// Extracts the `fields` selection on PATCH requests
pub trait PatchFieldExtractor {
    /// Parse and store the fields to update
    fn extract_patch_fields(&mut self, params: &QueryParams) -> Result<(), HttpError>;
}

/// A request object the binder can populate
///
/// Override the accessors for the capabilities the type supports. The
/// binder checks each one independently; implementing none of them means the
/// request is bound purely from its JSON body (or not at all on GET).
pub trait Bindable {
    /// Route parameter capability
    fn route_param_binder(&mut self) -> Option<&mut dyn RouteParamBinder> {
        None
    }

    /// Query parameter capability
    fn query_param_binder(&mut self) -> Option<&mut dyn QueryParamBinder> {
        None
    }

    /// Filter capability
    fn filter_binder(&mut self) -> Option<&mut dyn FilterBinder> {
        None
    }

    /// Sort capability
    fn sort_binder(&mut self) -> Option<&mut dyn SortBinder> {
        None
    }

    /// Patch field capability
    fn patch_field_extractor(&mut self) -> Option<&mut dyn PatchFieldExtractor> {
        None
    }
}
