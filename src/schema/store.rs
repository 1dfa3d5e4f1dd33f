//! Schema store
//!
//! Walks the routing document once and produces an immutable table of
//! strongly-typed route specs. Nothing mutates the store after `load`.

use hyper::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::value::TypedValue;
use crate::error::SchemaError;

/// Raw routing document as written by operators
#[derive(Debug, Deserialize)]
struct RoutingDocument {
    cmd: String,
    routing: BTreeMap<String, BTreeMap<String, Map<String, Value>>>,
}

/// Declared parameters of one route and method, keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    params: BTreeMap<String, TypedValue>,
}

impl ParameterSchema {
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.params.get(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Copy of `body` with every declared parameter the caller left out
    /// filled from its default
    pub fn fill_defaults(&self, body: &Map<String, Value>) -> Map<String, Value> {
        let mut filled = body.clone();
        for (name, default) in &self.params {
            if !filled.contains_key(name) {
                filled.insert(name.clone(), default.to_json());
            }
        }
        filled
    }
}

impl FromIterator<(String, TypedValue)> for ParameterSchema {
    fn from_iter<I: IntoIterator<Item = (String, TypedValue)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

/// One declared (path, method) pair
#[derive(Debug, Clone)]
pub struct RouteSpec {
    /// Route name as passed to the command via `-endpoint`
    pub name: String,
    /// Served path, always `/` + name
    pub path: String,
    pub method: Method,
    pub schema: ParameterSchema,
}

/// Parsed routing configuration
#[derive(Debug, Clone)]
pub struct SchemaStore {
    command: String,
    routes: Vec<RouteSpec>,
}

impl SchemaStore {
    /// Load a routing document from disk. `.toml` files are parsed as TOML,
    /// anything else as JSON.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        Self::build(serde_json::from_str(raw)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, SchemaError> {
        Self::build(toml::from_str(raw)?)
    }

    fn build(doc: RoutingDocument) -> Result<Self, SchemaError> {
        if doc.cmd.trim().is_empty() {
            return Err(SchemaError::EmptyCommand);
        }

        let mut table: BTreeMap<(String, String), RouteSpec> = BTreeMap::new();

        for (route, methods) in doc.routing {
            let name = route.trim_start_matches('/').to_string();
            if name.is_empty() {
                return Err(SchemaError::EmptyRoute);
            }
            if !is_literal_path(&name) {
                return Err(SchemaError::InvalidRouteName(route));
            }
            let path = format!("/{name}");

            for (verb, params) in methods {
                let upper = verb.to_ascii_uppercase();
                let method = Method::from_bytes(upper.as_bytes()).map_err(|_| {
                    SchemaError::InvalidMethod {
                        route: route.clone(),
                        method: verb.clone(),
                    }
                })?;

                let schema = params
                    .into_iter()
                    .map(|(param, default)| match TypedValue::from_json(default) {
                        Some(typed) => Ok((param, typed)),
                        None => Err(SchemaError::IntegerOutOfRange {
                            path: path.clone(),
                            method: upper.clone(),
                            param,
                        }),
                    })
                    .collect::<Result<ParameterSchema, _>>()?;

                let key = (path.clone(), upper.clone());
                if table.contains_key(&key) {
                    return Err(SchemaError::DuplicateRoute {
                        path: path.clone(),
                        method: upper,
                    });
                }
                table.insert(
                    key,
                    RouteSpec {
                        name: name.clone(),
                        path: path.clone(),
                        method,
                        schema,
                    },
                );
            }
        }

        Ok(Self {
            command: doc.cmd,
            routes: table.into_values().collect(),
        })
    }

    /// Path of the external command run for every request
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Route specs in (path, method) order
    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// True when `name` can appear in a request path without percent-encoding
fn is_literal_path(name: &str) -> bool {
    name.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b"-._~!$&'()*+,;=:@/".contains(&b))
}
