//! Users API Example - Declarative Request Binding
//!
//! This example shows how request types opt into binding capabilities:
//!
//! - A custom route parameter name (`{user_id}` instead of `{id}`)
//! - Pagination, filtering and sorting on list endpoints
//! - Extra query parameters next to the pagination bundle
//! - Field-selected partial updates on PATCH
//!
//! Run with: cargo run --example users-api
//!
//! The service runs on port 8080 by default (configurable via HTTP_BINDER_SERVICE__PORT)
//!
//! Test with:
//!   curl 'http://localhost:8080/users?limit=2'
//!   curl 'http://localhost:8080/users?filter.age%5Bgte%5D=30&sort=-age'
//!   curl 'http://localhost:8080/users?status=active&filter.name%5Bin%5D=alice,carol'
//!   curl http://localhost:8080/users/2
//!   curl -X POST http://localhost:8080/users -d '{"name":"dave","email":"dave@example.com"}'
//!   curl -X PATCH 'http://localhost:8080/users/2?fields=email' -d '{"email":"bob@corp.example"}'
//!   curl -X DELETE http://localhost:8080/users/2 -d '{}'
//!   curl 'http://localhost:8080/products?category=tools&sort=price'
//!   curl 'http://localhost:8080/products?filter.price%5Blt%5D=20&filter.in_stock%5Beq%5D=true'

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Extension;
use http_binder::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct User {
    id: String,
    name: String,
    email: String,
    status: String,
    age: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Product {
    id: String,
    name: String,
    category: String,
    price: f64,
    in_stock: bool,
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<u64, User>,
    products: Vec<Product>,
    next_id: u64,
}

type SharedStore = Arc<RwLock<Store>>;

/// Route parameter is `{user_id}`; name and email come from the body
#[derive(Debug, Default, Deserialize)]
struct UserRequest {
    #[serde(skip)]
    id: IdParam,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

impl RouteParamBinder for UserRequest {
    fn route_param_name(&self) -> &str {
        "user_id"
    }

    fn bind_route_param(&mut self, value: &str) {
        self.id.bind_route_param(value);
    }
}

impl Bindable for UserRequest {
    fn route_param_binder(&mut self) -> Option<&mut dyn RouteParamBinder> {
        Some(self)
    }
}

/// Body-only request for creating users
#[derive(Debug, Default, Deserialize)]
struct CreateUserRequest {
    name: String,
    email: String,
    #[serde(default)]
    age: u32,
}

impl Bindable for CreateUserRequest {}

#[derive(Debug, Default, Deserialize)]
struct UserListRequest {
    #[serde(skip)]
    page: PaginatedList<User>,
    #[serde(skip)]
    sort: SortParams,
    #[serde(skip)]
    filters: FilterParams,
    #[serde(skip)]
    status: String,
}

impl QueryParamBinder for UserListRequest {
    fn bind_query_params(&mut self, params: &QueryParams) -> std::result::Result<(), HttpError> {
        self.page.bind_query_params(params)?;
        self.status = params.get("status").unwrap_or_default().to_string();
        Ok(())
    }
}

impl Bindable for UserListRequest {
    fn query_param_binder(&mut self) -> Option<&mut dyn QueryParamBinder> {
        Some(self)
    }

    fn sort_binder(&mut self) -> Option<&mut dyn SortBinder> {
        Some(&mut self.sort)
    }

    fn filter_binder(&mut self) -> Option<&mut dyn FilterBinder> {
        Some(&mut self.filters)
    }
}

#[derive(Debug, Default, Deserialize)]
struct UserPatchRequest {
    #[serde(skip)]
    id: IdParam,
    #[serde(skip)]
    patch: PatchFields,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

impl RouteParamBinder for UserPatchRequest {
    fn route_param_name(&self) -> &str {
        "user_id"
    }

    fn bind_route_param(&mut self, value: &str) {
        self.id.bind_route_param(value);
    }
}

impl Bindable for UserPatchRequest {
    fn route_param_binder(&mut self) -> Option<&mut dyn RouteParamBinder> {
        Some(self)
    }

    fn patch_field_extractor(&mut self) -> Option<&mut dyn PatchFieldExtractor> {
        Some(&mut self.patch)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProductListRequest {
    #[serde(skip)]
    page: PaginatedList<Product>,
    #[serde(skip)]
    filters: FilterParams,
    #[serde(skip)]
    sort: SortParams,
    #[serde(skip)]
    category: String,
}

impl QueryParamBinder for ProductListRequest {
    fn bind_query_params(&mut self, params: &QueryParams) -> std::result::Result<(), HttpError> {
        self.page.bind_query_params(params)?;
        self.category = params.get("category").unwrap_or_default().to_string();
        Ok(())
    }
}

impl Bindable for ProductListRequest {
    fn query_param_binder(&mut self) -> Option<&mut dyn QueryParamBinder> {
        Some(self)
    }

    fn filter_binder(&mut self) -> Option<&mut dyn FilterBinder> {
        Some(&mut self.filters)
    }

    fn sort_binder(&mut self) -> Option<&mut dyn SortBinder> {
        Some(&mut self.sort)
    }
}

fn store(ctx: &RequestContext) -> Result<SharedStore> {
    ctx.extension::<SharedStore>()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("store extension missing").into())
}

fn parse_id(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| HttpError::bad_request(format!("invalid user id '{raw}'")).into())
}

fn user_field(user: &User, field: &str) -> Option<String> {
    match field {
        "id" => Some(user.id.clone()),
        "name" => Some(user.name.clone()),
        "email" => Some(user.email.clone()),
        "status" => Some(user.status.clone()),
        "age" => Some(user.age.to_string()),
        _ => None,
    }
}

fn product_field(product: &Product, field: &str) -> Option<String> {
    match field {
        "id" => Some(product.id.clone()),
        "name" => Some(product.name.clone()),
        "category" => Some(product.category.clone()),
        "price" => Some(product.price.to_string()),
        "in_stock" => Some(product.in_stock.to_string()),
        _ => None,
    }
}

/// Evaluate `condition` against a record, reading fields through `field`
fn matches<T>(
    record: &T,
    field: fn(&T, &str) -> Option<String>,
    condition: &FilterCondition,
) -> Result<bool> {
    let actual = field(record, &condition.field).ok_or_else(|| {
        HttpError::bad_request(format!("cannot filter on '{}'", condition.field))
    })?;

    let compare = |expected: &str| match (actual.parse::<f64>(), expected.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => actual.as_str().cmp(expected),
    };

    Ok(match (condition.operator, &condition.value) {
        (FilterOperator::IsNull, _) => actual.is_empty(),
        (FilterOperator::NotNull, _) => !actual.is_empty(),
        (FilterOperator::In, FilterValue::Multi(values)) => values.contains(&actual),
        (FilterOperator::NotIn, FilterValue::Multi(values)) => !values.contains(&actual),
        (op, FilterValue::Single(expected)) => match op {
            FilterOperator::Eq => actual == *expected,
            FilterOperator::Ne => actual != *expected,
            FilterOperator::Gt => compare(expected) == Ordering::Greater,
            FilterOperator::Gte => compare(expected) != Ordering::Less,
            FilterOperator::Lt => compare(expected) == Ordering::Less,
            FilterOperator::Lte => compare(expected) != Ordering::Greater,
            FilterOperator::Contains => actual.contains(expected.as_str()),
            FilterOperator::Prefix => actual.starts_with(expected.as_str()),
            FilterOperator::Suffix => actual.ends_with(expected.as_str()),
            _ => false,
        },
        _ => false,
    })
}

/// Offset-based cursor over an already filtered and sorted list
fn paginate<T: Clone>(items: &[T], limit: u32, cursor: &str) -> Result<PaginatedList<T>> {
    let start = if cursor.is_empty() {
        0
    } else {
        cursor
            .parse::<usize>()
            .map_err(|_| HttpError::bad_request("invalid next_cursor"))?
    };
    let end = items.len().min(start.saturating_add(limit as usize));
    let page = items.get(start..end).unwrap_or_default().to_vec();
    let next_cursor = if end < items.len() {
        end.to_string()
    } else {
        String::new()
    };
    Ok(PaginatedList::new(page, limit, next_cursor))
}

async fn list_users(ctx: RequestContext, req: UserListRequest) -> Result<Option<PaginatedList<User>>> {
    let store = store(&ctx)?;
    let store = store.read().await;

    let mut users = Vec::new();
    for user in store.users.values() {
        if !req.status.is_empty() && user.status != req.status {
            continue;
        }
        let mut keep = true;
        for condition in &req.filters.conditions {
            keep &= matches(user, user_field, condition)?;
        }
        if keep {
            users.push(user.clone());
        }
    }

    users.sort_by(|a, b| {
        req.sort
            .fields
            .iter()
            .map(|sort| {
                let ordering = match sort.field.as_str() {
                    "age" => a.age.cmp(&b.age),
                    field => user_field(a, field).cmp(&user_field(b, field)),
                };
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let params = req.page.params();
    paginate(&users, params.limit, &params.cursor).map(Some)
}

async fn get_user(ctx: RequestContext, req: UserRequest) -> Result<Option<User>> {
    let id = parse_id(req.id.as_str())?;
    let store = store(&ctx)?;
    let user = store.read().await.users.get(&id).cloned();
    user.map(Some)
        .ok_or_else(|| HttpError::not_found("user not found").into())
}

async fn create_user(ctx: RequestContext, req: CreateUserRequest) -> Result<Option<User>> {
    if req.name.is_empty() || req.email.is_empty() {
        return Err(HttpError::bad_request("name and email are required").into());
    }

    let store = store(&ctx)?;
    let mut store = store.write().await;
    if store.users.values().any(|user| user.email == req.email) {
        return Err(HttpError::conflict("email already registered").into());
    }

    store.next_id += 1;
    let id = store.next_id;
    let user = User {
        id: id.to_string(),
        name: req.name,
        email: req.email,
        status: "active".to_string(),
        age: req.age,
    };
    store.users.insert(id, user.clone());
    tracing::info!(user_id = id, "user created");
    Ok(Some(user))
}

async fn update_user(ctx: RequestContext, req: UserRequest) -> Result<Option<User>> {
    let id = parse_id(req.id.as_str())?;
    let store = store(&ctx)?;
    let mut store = store.write().await;
    let user = store
        .users
        .get_mut(&id)
        .ok_or_else(|| HttpError::not_found("user not found"))?;
    user.name = req.name;
    user.email = req.email;
    Ok(Some(user.clone()))
}

async fn patch_user(ctx: RequestContext, req: UserPatchRequest) -> Result<Option<User>> {
    let id = parse_id(req.id.as_str())?;
    let store = store(&ctx)?;
    let mut store = store.write().await;
    let user = store
        .users
        .get_mut(&id)
        .ok_or_else(|| HttpError::not_found("user not found"))?;

    for field in req.patch.iter() {
        match field {
            "name" => user.name = req.name.clone(),
            "email" => user.email = req.email.clone(),
            other => {
                return Err(HttpError::bad_request(format!("field '{other}' cannot be updated")).into())
            }
        }
    }
    Ok(Some(user.clone()))
}

async fn delete_user(ctx: RequestContext, req: UserRequest) -> Result<Option<()>> {
    let id = parse_id(req.id.as_str())?;
    let store = store(&ctx)?;
    let removed = store.write().await.users.remove(&id);
    match removed {
        Some(_) => Ok(None),
        None => Err(HttpError::not_found("user not found").into()),
    }
}

async fn list_products(
    ctx: RequestContext,
    req: ProductListRequest,
) -> Result<Option<PaginatedList<Product>>> {
    let store = store(&ctx)?;
    let store = store.read().await;

    let mut products = Vec::new();
    for product in &store.products {
        if !req.category.is_empty() && product.category != req.category {
            continue;
        }
        let mut keep = true;
        for condition in &req.filters.conditions {
            keep &= matches(product, product_field, condition)?;
        }
        if keep {
            products.push(product.clone());
        }
    }

    if let Some(sort) = req.sort.primary() {
        products.sort_by(|a, b| {
            let ordering = match sort.field.as_str() {
                "price" => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
                "name" => a.name.cmp(&b.name),
                _ => a.id.cmp(&b.id),
            };
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    let params = req.page.params();
    paginate(&products, params.limit, &params.cursor).map(Some)
}

fn seed() -> Store {
    let mut store = Store::default();
    for (name, status, age) in [
        ("alice", "active", 34),
        ("bob", "inactive", 27),
        ("carol", "active", 41),
    ] {
        store.next_id += 1;
        store.users.insert(
            store.next_id,
            User {
                id: store.next_id.to_string(),
                name: name.to_string(),
                email: format!("{name}@example.com"),
                status: status.to_string(),
                age,
            },
        );
    }
    store.products = [
        ("p1", "hammer", "tools", 12.5, true),
        ("p2", "wrench", "tools", 9.0, false),
        ("p3", "lamp", "home", 30.0, true),
    ]
    .into_iter()
    .map(|(id, name, category, price, in_stock)| Product {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price,
        in_stock,
    })
    .collect();
    store
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let store: SharedStore = Arc::new(RwLock::new(seed()));
    Server::new(config).serve(app(store)).await
}

fn app(store: SharedStore) -> Router {
    Router::new()
        .route(
            "/users",
            get(bind_handler(list_users)).post(bind_handler(create_user)),
        )
        .route(
            "/users/{user_id}",
            get(bind_handler(get_user))
                .put(bind_handler(update_user))
                .patch(bind_handler(patch_user))
                .delete(bind_handler(delete_user)),
        )
        .route("/products", get(bind_handler(list_products)))
        .layer(Extension(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let store: SharedStore = Arc::new(RwLock::new(seed()));
        let response = app(store)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn ids(body: &serde_json::Value) -> Vec<&str> {
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_products_apply_filters() {
        let (status, body) = get_json("/products?filter.price%5Blt%5D=20&sort=-price").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), ["p1", "p2"]);

        let (_, body) =
            get_json("/products?filter.in_stock%5Beq%5D=true&filter.category%5Bne%5D=home").await;
        assert_eq!(ids(&body), ["p1"]);
    }

    #[tokio::test]
    async fn test_products_reject_unknown_filter_field() {
        let (status, body) = get_json("/products?filter.colour%5Beq%5D=red").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "cannot filter on 'colour'");
    }

    #[tokio::test]
    async fn test_users_still_filter_and_sort() {
        let (status, body) = get_json("/users?filter.age%5Bgte%5D=30&sort=-age").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), ["3", "1"]);
    }
}
