//! Generic bind → invoke → respond handler adapter
//!
//! [`bind_handler`] turns an async function taking a [`RequestContext`] and a
//! bound request object into an axum [`Handler`]. Binding failures and errors
//! returned by the function both render through
//! [`respond_error`](crate::respond_error); a returned value renders through
//! [`respond_success`](crate::respond_success).
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use http_binder::{bind_handler, Bindable, HttpError, IdParam, RequestContext, RouteParamBinder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct GetUser {
//!     #[serde(skip)]
//!     id: IdParam,
//! }
//!
//! impl Bindable for GetUser {
//!     fn route_param_binder(&mut self) -> Option<&mut dyn RouteParamBinder> {
//!         Some(&mut self.id)
//!     }
//! }
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: String,
//! }
//!
//! async fn get_user(_ctx: RequestContext, req: GetUser) -> http_binder::Result<Option<User>> {
//!     if req.id.as_str() == "0" {
//!         return Err(HttpError::not_found("user not found").into());
//!     }
//!     Ok(Some(User { id: req.id.id }))
//! }
//!
//! let app: Router = Router::new().route("/users/{id}", get(bind_handler(get_user)));
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use axum::{
    extract::{FromRequest, Request},
    handler::Handler,
    http::{request::Parts, Extensions, HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::binder::Bound;
use crate::capability::Bindable;
use crate::error::Result;
use crate::responder::{respond_error, respond_success};

/// Request metadata passed to bound handlers
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request method
    pub method: Method,
    /// Request URI
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
    /// Request extensions, e.g. values inserted by middleware
    pub extensions: Extensions,
}

impl RequestContext {
    /// A header value, if present and valid UTF-8
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// A request extension by type
    #[must_use]
    pub fn extension<E>(&self) -> Option<&E>
    where
        E: Send + Sync + 'static,
    {
        self.extensions.get::<E>()
    }
}

impl From<&Parts> for RequestContext {
    fn from(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            extensions: parts.extensions.clone(),
        }
    }
}

/// Adapts a bound handler function to axum's [`Handler`] trait
pub struct BindHandler<F, T, R> {
    f: F,
    _marker: PhantomData<fn() -> (T, R)>,
}

impl<F: Clone, T, R> Clone for BindHandler<F, T, R> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

/// Wrap `f` so it can be routed with `axum::routing::{get, post, ...}`
///
/// `f` returns `Ok(None)` for `204 No Content`, `Ok(Some(body))` for `200`
/// with a JSON body, or an [`Error`](crate::Error).
pub fn bind_handler<F, Fut, T, R>(f: F) -> BindHandler<F, T, R>
where
    F: Fn(RequestContext, T) -> Fut,
    Fut: Future<Output = Result<Option<R>>>,
{
    BindHandler {
        f,
        _marker: PhantomData,
    }
}

impl<F, Fut, T, R, S> Handler<(Bound<T>,), S> for BindHandler<F, T, R>
where
    F: Fn(RequestContext, T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>>> + Send + 'static,
    T: Bindable + Default + DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    S: Clone + Send + Sync + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, req: Request, state: S) -> Self::Future {
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let ctx = RequestContext::from(&parts);

            let bound = match Bound::<T>::from_request(Request::from_parts(parts, body), &state).await {
                Ok(Bound(value)) => value,
                Err(err) => return err.into_response(),
            };

            match (self.f)(ctx, bound).await {
                Ok(body) => respond_success(body.as_ref()),
                Err(err) => respond_error(&err),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{PatchFieldExtractor, QueryParamBinder, RouteParamBinder};
    use crate::error::HttpError;
    use crate::pagination::PaginatedList;
    use crate::params::IdParam;
    use crate::patch::PatchFields;
    use axum::{
        body::Body,
        http::{self, StatusCode},
        routing::get,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Default, Deserialize)]
    struct GetItem {
        #[serde(skip)]
        id: IdParam,
    }

    impl Bindable for GetItem {
        fn route_param_binder(&mut self) -> Option<&mut dyn RouteParamBinder> {
            Some(&mut self.id)
        }
    }

    #[derive(Debug, Default, Deserialize)]
    struct ListItems {
        #[serde(skip)]
        page: PaginatedList<String>,
    }

    impl Bindable for ListItems {
        fn query_param_binder(&mut self) -> Option<&mut dyn QueryParamBinder> {
            Some(&mut self.page)
        }
    }

    #[derive(Debug, Default, Deserialize)]
    struct CreateItem {
        name: String,
    }

    impl Bindable for CreateItem {}

    #[derive(Debug, Default, Deserialize)]
    struct PatchItem {
        #[serde(skip)]
        id: IdParam,
        #[serde(skip)]
        patch: PatchFields,
    }

    impl Bindable for PatchItem {
        fn route_param_binder(&mut self) -> Option<&mut dyn RouteParamBinder> {
            Some(&mut self.id)
        }

        fn patch_field_extractor(&mut self) -> Option<&mut dyn PatchFieldExtractor> {
            Some(&mut self.patch)
        }
    }

    #[derive(Debug, Serialize)]
    struct Item {
        id: String,
        name: String,
    }

    async fn get_item(ctx: RequestContext, req: GetItem) -> Result<Option<Item>> {
        match req.id.as_str() {
            "missing" => Err(HttpError::not_found("item not found").into()),
            "broken" => Err(anyhow::anyhow!("storage offline").into()),
            id => Ok(Some(Item {
                id: id.to_string(),
                name: ctx.header("x-name").unwrap_or("unnamed").to_string(),
            })),
        }
    }

    async fn list_items(_ctx: RequestContext, req: ListItems) -> Result<Option<PaginatedList<Item>>> {
        let items = (0..req.page.limit.min(2))
            .map(|n| Item {
                id: n.to_string(),
                name: format!("item-{n}"),
            })
            .collect();
        Ok(Some(PaginatedList::new(items, req.page.limit, "next")))
    }

    async fn create_item(ctx: RequestContext, req: CreateItem) -> Result<Option<Item>> {
        Ok(Some(Item {
            id: ctx.method.to_string().to_lowercase(),
            name: req.name,
        }))
    }

    async fn patch_item(_ctx: RequestContext, req: PatchItem) -> Result<Option<Item>> {
        if req.id.as_str() != "7" || !req.patch.contains("name") {
            return Err(HttpError::bad_request("unexpected patch").into());
        }
        Ok(None)
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/items",
                get(bind_handler(list_items)).post(bind_handler(create_item)),
            )
            .route(
                "/items/{id}",
                get(bind_handler(get_item)).patch(bind_handler(patch_item)),
            )
    }

    async fn send(req: http::Request<Body>) -> (StatusCode, String) {
        let response = app().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> http::Request<Body> {
        http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_json() {
        let req = http::Request::builder()
            .uri("/items/42")
            .header("x-name", "widget")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"id":"42","name":"widget"}"#);
    }

    #[tokio::test]
    async fn test_business_error_is_rendered() {
        let (status, body) = send(get_request("/items/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"item not found"}"#);
    }

    #[tokio::test]
    async fn test_unclassified_business_error_is_hidden() {
        let (status, body) = send(get_request("/items/broken")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"Internal server error"}"#);
    }

    #[tokio::test]
    async fn test_list_returns_paginated_envelope() {
        let (status, body) = send(get_request("/items?limit=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            r#"{"limit":1,"next_cursor":"next","items":[{"id":"0","name":"item-0"}]}"#
        );
    }

    #[tokio::test]
    async fn test_binding_error_skips_handler() {
        let (status, body) = send(get_request("/items?limit=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"limit must be a positive integer"}"#);
    }

    #[tokio::test]
    async fn test_post_decodes_body() {
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/items")
            .body(Body::from(r#"{"name":"gear"}"#))
            .unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"id":"post","name":"gear"}"#);

        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/items")
            .body(Body::from("{"))
            .unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"invalid JSON in request body"}"#);
    }

    #[tokio::test]
    async fn test_none_is_no_content() {
        let req = http::Request::builder()
            .method(Method::PATCH)
            .uri("/items/7?fields=name")
            .body(Body::from(r#"{"name":"x"}"#))
            .unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }
}
