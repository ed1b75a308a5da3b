//! # http-binder
//!
//! Declarative request binding and JSON response formatting for axum.
//!
//! A request type opts into the ways it can be populated by implementing
//! [`Bindable`] and exposing capability bundles:
//!
//! - **Route parameter**: [`IdParam`] or a custom [`RouteParamBinder`]
//! - **Pagination**: [`PaginatedList`] (`limit`, `next_cursor`)
//! - **Filtering**: [`FilterParams`] (`filter.<field>[<op>]=<value>`)
//! - **Sorting**: [`SortParams`] (`sort=name,-created_at`)
//! - **Partial updates**: [`PatchFields`] (`fields=name,email` on PATCH)
//!
//! Anything else comes from the JSON body on methods other than GET. Handlers
//! return `Result<Option<T>>`, which renders as `200` JSON, `204`, or a
//! `{"error": "..."}` envelope with the right status.
//!
//! ## Example
//!
//! ```rust,no_run
//! use http_binder::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct ListUsers {
//!     #[serde(skip)]
//!     page: PaginatedList<User>,
//!     #[serde(skip)]
//!     sort: SortParams,
//! }
//!
//! impl Bindable for ListUsers {
//!     fn query_param_binder(&mut self) -> Option<&mut dyn QueryParamBinder> {
//!         Some(&mut self.page)
//!     }
//!
//!     fn sort_binder(&mut self) -> Option<&mut dyn SortBinder> {
//!         Some(&mut self.sort)
//!     }
//! }
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct User {
//!     id: String,
//! }
//!
//! async fn list_users(_ctx: RequestContext, req: ListUsers) -> Result<Option<PaginatedList<User>>> {
//!     Ok(Some(PaginatedList::new(Vec::new(), req.page.limit, "")))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let app = Router::new().route("/users", get(bind_handler(list_users)));
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod binder;
pub mod capability;
pub mod config;
pub mod error;
pub mod filter;
pub mod handler;
pub mod observability;
pub mod pagination;
pub mod params;
pub mod patch;
pub mod query;
pub mod responder;
pub mod server;
pub mod sort;

pub use binder::{bind, decode_body, BindSource, Bound};
pub use capability::{
    Bindable, FilterBinder, PatchFieldExtractor, QueryParamBinder, RouteParamBinder, SortBinder,
};
pub use config::{BindConfig, Config, ServiceConfig};
pub use error::{BindStage, Error, ErrorResponse, HttpError, Result};
pub use filter::{
    parse_filters, FilterCondition, FilterOperator, FilterParams, FilterValue, OperatorArity,
    UnknownOperator,
};
pub use handler::{bind_handler, BindHandler, RequestContext};
pub use observability::init_tracing;
pub use pagination::{
    parse_pagination, PaginatedList, PaginationParams, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use params::IdParam;
pub use patch::{extract_patch_fields, PatchFields};
pub use query::QueryParams;
pub use responder::{respond_error, respond_success};
pub use server::Server;
pub use sort::{parse_sort, SortDirection, SortField, SortParams};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::binder::{bind, BindSource, Bound};
    pub use crate::capability::{
        Bindable, FilterBinder, PatchFieldExtractor, QueryParamBinder, RouteParamBinder,
        SortBinder,
    };
    pub use crate::config::{BindConfig, Config};
    pub use crate::error::{Error, HttpError, Result};
    pub use crate::filter::{FilterCondition, FilterOperator, FilterParams, FilterValue};
    pub use crate::handler::{bind_handler, RequestContext};
    pub use crate::observability::init_tracing;
    pub use crate::pagination::{PaginatedList, PaginationParams};
    pub use crate::params::IdParam;
    pub use crate::patch::PatchFields;
    pub use crate::query::QueryParams;
    pub use crate::responder::{respond_error, respond_success};
    pub use crate::server::Server;
    pub use crate::sort::{SortDirection, SortField, SortParams};

    pub use axum::{
        routing::{delete, get, patch, post, put},
        Router,
    };
}
