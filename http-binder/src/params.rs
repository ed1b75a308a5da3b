//! Route parameter bundle
//!
//! [`IdParam`] binds the `{id}` segment of a route. A request type whose path
//! parameter has another name implements [`RouteParamBinder`] itself and
//! forwards the value:
//!
//! ```rust
//! use http_binder::{Bindable, IdParam, RouteParamBinder};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct GetUser {
//!     #[serde(skip)]
//!     id: IdParam,
//! }
//!
//! impl RouteParamBinder for GetUser {
//!     fn route_param_name(&self) -> &str {
//!         "user_id"
//!     }
//!
//!     fn bind_route_param(&mut self, value: &str) {
//!         self.id.bind_route_param(value);
//!     }
//! }
//!
//! impl Bindable for GetUser {
//!     fn route_param_binder(&mut self) -> Option<&mut dyn RouteParamBinder> {
//!         Some(self)
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::capability::RouteParamBinder;

/// Path parameter read by [`IdParam`] unless overridden
pub const DEFAULT_ROUTE_PARAM: &str = "id";

/// Holds an entity identifier taken from the route
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdParam {
    /// The bound identifier
    #[serde(default)]
    pub id: String,
}

impl IdParam {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The bound identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl RouteParamBinder for IdParam {
    fn route_param_name(&self) -> &str {
        DEFAULT_ROUTE_PARAM
    }

    fn bind_route_param(&mut self, value: &str) {
        self.id = value.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_route_param_name() {
        assert_eq!(IdParam::default().route_param_name(), "id");
    }

    #[test]
    fn test_bind_replaces_value() {
        let mut param = IdParam::new("old");
        param.bind_route_param("42");
        assert_eq!(param.as_str(), "42");
    }

    #[test]
    fn test_deserializes_without_id() {
        let param: IdParam = serde_json::from_str("{}").unwrap();
        assert_eq!(param, IdParam::default());
    }
}
