//! Request binding
//!
//! [`bind`] populates a request object from the parts of an HTTP request,
//! consulting the capabilities the object exposes through [`Bindable`]:
//!
//! 1. route parameter, if the object binds one (all methods);
//! 2. on `GET`: query parameters, then filters, then sort;
//! 3. on `PATCH`: the `fields` selection, then the JSON body;
//! 4. on any other method: the JSON body.
//!
//! The first failure stops binding and is wrapped with the [`BindStage`] that
//! produced it. [`Bound`] runs the same sequence as an axum extractor.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use axum::{
    body::Bytes,
    extract::{
        rejection::RawPathParamsRejection, FromRequest, FromRequestParts, RawPathParams, Request,
    },
    http::{Method, StatusCode},
};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;

use crate::capability::Bindable;
use crate::config::BindConfig;
use crate::error::{BindStage, Error, HttpError, Result};
use crate::query::QueryParams;

/// The parts of a request the binder reads
#[derive(Debug, Clone)]
pub struct BindSource {
    /// Request method
    pub method: Method,
    /// Path parameters captured by the router, by name
    pub route_params: HashMap<String, String>,
    /// Parsed query string
    pub query: QueryParams,
    /// Buffered request body, if one was read
    pub body: Option<Bytes>,
}

impl BindSource {
    /// A source with no route params, query or body
    pub fn new(method: Method) -> Self {
        Self {
            method,
            route_params: HashMap::new(),
            query: QueryParams::new(),
            body: None,
        }
    }

    /// Add a path parameter
    #[must_use]
    pub fn with_route_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_params.insert(name.into(), value.into());
        self
    }

    /// Set the query string (raw, without `?`)
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = QueryParams::parse(query);
        self
    }

    /// Set the request body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    fn reads_body(&self) -> bool {
        self.method != Method::GET
    }
}

/// State carried from the parameter stages into body decoding
struct Preflight {
    route_value: Option<String>,
}

/// Bind `source` onto `target`
///
/// On methods that carry a body, `target` is replaced by the decoded body with
/// the route value and patch selection bound again on top, so values from the
/// URL always win over the same fields in the body.
///
/// # Example
///
/// ```rust
/// use axum::http::Method;
/// use http_binder::{bind, Bindable, BindSource, SortBinder, SortParams};
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct ListUsers {
///     #[serde(skip)]
///     sort: SortParams,
/// }
///
/// impl Bindable for ListUsers {
///     fn sort_binder(&mut self) -> Option<&mut dyn SortBinder> {
///         Some(&mut self.sort)
///     }
/// }
///
/// let source = BindSource::new(Method::GET).with_query("sort=-created_at");
/// let mut req = ListUsers::default();
/// bind(&source, &mut req).unwrap();
/// assert_eq!(req.sort.fields[0].field, "created_at");
/// ```
pub fn bind<T>(source: &BindSource, target: &mut T) -> Result<()>
where
    T: Bindable + DeserializeOwned,
{
    let preflight = bind_params(source, target)?;
    if source.reads_body() {
        bind_body(source, &preflight, target)?;
    }
    Ok(())
}

/// Route, query and patch stages; everything that does not need the body
fn bind_params<T>(source: &BindSource, target: &mut T) -> Result<Preflight>
where
    T: Bindable + ?Sized,
{
    let route_value = bind_route(source, target).map_err(|err| {
        log_failure(source, BindStage::Route, &err);
        Error::from(err).in_stage(BindStage::Route)
    })?;

    if source.method == Method::GET {
        bind_query(&source.query, target).map_err(|err| {
            log_failure(source, BindStage::Query, &err);
            Error::from(err).in_stage(BindStage::Query)
        })?;
    } else if source.method == Method::PATCH {
        bind_patch(&source.query, target).map_err(|err| {
            log_failure(source, BindStage::Patch, &err);
            Error::from(err).in_stage(BindStage::Patch)
        })?;
    }

    Ok(Preflight { route_value })
}

/// JSON stage, followed by re-binding route and patch data onto the decoded value
fn bind_body<T>(source: &BindSource, preflight: &Preflight, target: &mut T) -> Result<()>
where
    T: Bindable + DeserializeOwned,
{
    let mut decoded: T = decode_body(source.body.as_deref()).map_err(|err| {
        log_failure(source, BindStage::Json, &err);
        Error::from(err).in_stage(BindStage::Json)
    })?;

    if let (Some(value), Some(binder)) =
        (preflight.route_value.as_deref(), decoded.route_param_binder())
    {
        binder.bind_route_param(value);
    }
    if source.method == Method::PATCH {
        bind_patch(&source.query, &mut decoded)
            .map_err(|err| Error::from(err).in_stage(BindStage::Patch))?;
    }

    *target = decoded;
    tracing::debug!(method = %source.method, "request body bound");
    Ok(())
}

fn bind_route<T>(
    source: &BindSource,
    target: &mut T,
) -> std::result::Result<Option<String>, HttpError>
where
    T: Bindable + ?Sized,
{
    let Some(binder) = target.route_param_binder() else {
        return Ok(None);
    };

    let name = binder.route_param_name().to_string();
    let value = source
        .route_params
        .get(&name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            HttpError::bad_request(format!("missing required route parameter: {name}"))
        })?;

    binder.bind_route_param(value);
    tracing::debug!(param = %name, "route parameter bound");
    Ok(Some(value.clone()))
}

fn bind_query<T>(query: &QueryParams, target: &mut T) -> std::result::Result<(), HttpError>
where
    T: Bindable + ?Sized,
{
    if let Some(binder) = target.query_param_binder() {
        binder.bind_query_params(query)?;
    }
    if let Some(binder) = target.filter_binder() {
        binder.bind_filters(query)?;
    }
    if let Some(binder) = target.sort_binder() {
        binder.bind_sort(query)?;
    }
    Ok(())
}

fn bind_patch<T>(query: &QueryParams, target: &mut T) -> std::result::Result<(), HttpError>
where
    T: Bindable + ?Sized,
{
    match target.patch_field_extractor() {
        Some(extractor) => extractor.extract_patch_fields(query),
        None => Ok(()),
    }
}

fn log_failure(source: &BindSource, stage: BindStage, err: &HttpError) {
    tracing::debug!(
        method = %source.method,
        stage = %stage,
        status = err.status().as_u16(),
        error = %err,
        "request binding failed"
    );
}

/// Decode a JSON request body
///
/// A missing or empty body is rejected. Parser detail is logged, never
/// returned, so clients only see a generic message.
///
/// # Example
///
/// ```rust
/// use http_binder::decode_body;
///
/// let value: serde_json::Value = decode_body(Some(br#"{"name":"Ada"}"#.as_slice())).unwrap();
/// assert_eq!(value["name"], "Ada");
///
/// let err = decode_body::<serde_json::Value>(None).unwrap_err();
/// assert_eq!(err.message(), "request body is required");
/// ```
pub fn decode_body<T>(body: Option<&[u8]>) -> std::result::Result<T, HttpError>
where
    T: DeserializeOwned,
{
    let body = body
        .filter(|body| !body.is_empty())
        .ok_or_else(|| HttpError::bad_request("request body is required"))?;

    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "invalid JSON in request body");
        HttpError::bad_request("invalid JSON in request body")
    })
}

/// Extractor that binds the request into `T`
///
/// Rejections are [`Error`]s and render through the responder. The body limit
/// comes from a [`BindConfig`] extension when one is installed.
///
/// ```rust,no_run
/// use axum::{routing::get, Json, Router};
/// use http_binder::{Bindable, Bound, IdParam, RouteParamBinder};
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct GetUser {
///     #[serde(skip)]
///     id: IdParam,
/// }
///
/// impl Bindable for GetUser {
///     fn route_param_binder(&mut self) -> Option<&mut dyn RouteParamBinder> {
///         Some(&mut self.id)
///     }
/// }
///
/// async fn get_user(Bound(req): Bound<GetUser>) -> Json<String> {
///     Json(req.id.id)
/// }
///
/// let app: Router = Router::new().route("/users/{id}", get(get_user));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bound<T>(pub T);

impl<T> Bound<T> {
    /// Unwrap the bound request
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Bound<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Bound<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<S, T> FromRequest<S> for Bound<T>
where
    S: Send + Sync,
    T: Bindable + Default + DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let (mut parts, body) = req.into_parts();

        let route_params: HashMap<String, String> =
            match RawPathParams::from_request_parts(&mut parts, state).await {
                Ok(params) => params
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
                // routes without captures have no path params to extract
                Err(RawPathParamsRejection::MissingPathParams(_)) => HashMap::new(),
                Err(rejection) => {
                    let err = HttpError::bad_request(format!(
                        "invalid route parameter: {}",
                        rejection.body_text()
                    ));
                    tracing::debug!(error = %err, "request binding failed");
                    return Err(Error::from(err).in_stage(BindStage::Route));
                }
            };

        let mut source = BindSource {
            method: parts.method.clone(),
            route_params,
            query: QueryParams::parse(parts.uri.query().unwrap_or_default()),
            body: None,
        };

        let mut target = T::default();
        let preflight = bind_params(&source, &mut target)?;

        if source.reads_body() {
            let limit = parts
                .extensions
                .get::<BindConfig>()
                .copied()
                .unwrap_or_default()
                .body_limit_bytes;
            let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
                tracing::debug!(error = %err, limit, "failed to read request body");
                let err = if exceeds_limit(&err) {
                    HttpError::new(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
                } else {
                    HttpError::bad_request("failed to read request body")
                };
                Error::from(err).in_stage(BindStage::Json)
            })?;
            source.body = Some(bytes);
            bind_body(&source, &preflight, &mut target)?;
        }

        Ok(Bound(target))
    }
}

/// Whether a body read failed because it crossed the length limit
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if inner.is::<LengthLimitError>() {
            return true;
        }
        source = inner.source();
    }
    false
}
