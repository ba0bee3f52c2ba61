//! Route lookup and dispatch table.
//!
//! # Responsibilities
//! - Store the fixed (method, pattern) → operation bindings
//! - Look up the binding for a request
//! - Bind declared parameters from the query string and route values
//! - Return an explicit no-match that tells 404 apart from 405
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over bindings (the table is small and fixed)
//! - Overlapping bindings are a construction error, not a runtime tie-break

use std::collections::HashMap;

use axum::http::Method;
use thiserror::Error;

use crate::routing::matcher::{PathPattern, RouteValues};

/// Errors raised while building a route table.
#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("pattern `{0}` declares more than one route variable")]
    MultipleVariables(String),

    #[error("pattern `{0}` contains an empty segment")]
    EmptySegment(String),

    #[error("pattern `{0}` contains an unnamed route variable")]
    EmptyVariable(String),

    #[error("binding {method} {second} overlaps {method} {first}")]
    Overlap {
        method: Method,
        first: String,
        second: String,
    },
}

/// The catalog action a binding triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListAll,
    FetchByIndex,
    AddBook,
    ReplaceBook,
    DeleteBook,
}

impl Operation {
    /// Stable name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListAll => "list_all",
            Operation::FetchByIndex => "fetch_by_index",
            Operation::AddBook => "add_book",
            Operation::ReplaceBook => "replace_book",
            Operation::DeleteBook => "delete_book",
        }
    }
}

/// Where a declared parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// The query string.
    Query,
    /// A captured route variable of the same name.
    Route,
}

/// A parameter the operation expects, and its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub source: ParamSource,
}

impl ParamSpec {
    pub const fn query(name: &'static str) -> Self {
        Self { name, source: ParamSource::Query }
    }

    pub const fn route(name: &'static str) -> Self {
        Self { name, source: ParamSource::Route }
    }
}

const NO_PARAMS: &[ParamSpec] = &[];
const INDEX_FROM_QUERY: &[ParamSpec] = &[ParamSpec::query("index")];
const INDEX_FROM_ROUTE: &[ParamSpec] = &[ParamSpec::route("index")];
const BOOK_NAME_FROM_QUERY: &[ParamSpec] = &[ParamSpec::query("bookName")];
const REPLACE_PARAMS: &[ParamSpec] = &[ParamSpec::route("oldName"), ParamSpec::query("newName")];

/// A single (method, pattern) → operation mapping.
#[derive(Debug, Clone)]
pub struct RouteBinding {
    pub method: Method,
    pub pattern: PathPattern,
    pub operation: Operation,
    pub params: &'static [ParamSpec],
}

impl RouteBinding {
    pub fn new(
        method: Method,
        pattern: &str,
        operation: Operation,
        params: &'static [ParamSpec],
    ) -> Result<Self, RouteTableError> {
        Ok(Self {
            method,
            pattern: PathPattern::parse(pattern)?,
            operation,
            params,
        })
    }

    /// Collect the declared parameters from their sources.
    ///
    /// A parameter missing from its source is left unbound; the operation
    /// decides what absence means.
    pub fn bind(&self, values: &RouteValues, query: &HashMap<String, String>) -> BoundParams {
        let mut bound = BoundParams::default();
        for param in self.params {
            let value = match param.source {
                ParamSource::Query => query.get(param.name).map(String::as_str),
                ParamSource::Route => values.get(param.name),
            };
            if let Some(value) = value {
                bound.values.insert(param.name, value.to_string());
            }
        }
        bound
    }
}

/// Parameters bound for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundParams {
    values: HashMap<&'static str, String>,
}

impl BoundParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// A binding selected for a request, with its captured route values.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub binding: &'a RouteBinding,
    pub values: RouteValues,
}

/// Outcome of resolving a request against the table.
#[derive(Debug)]
pub enum Resolution<'a> {
    Matched(RouteMatch<'a>),
    /// The path is known, but only under these methods.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Immutable table of route bindings.
#[derive(Debug, Clone)]
pub struct RouteTable {
    bindings: Vec<RouteBinding>,
}

impl RouteTable {
    /// Build a table, rejecting bindings that overlap in (method, path) space.
    pub fn new(bindings: Vec<RouteBinding>) -> Result<Self, RouteTableError> {
        for (i, first) in bindings.iter().enumerate() {
            for second in &bindings[i + 1..] {
                if first.method == second.method && first.pattern.overlaps(&second.pattern) {
                    return Err(RouteTableError::Overlap {
                        method: first.method.clone(),
                        first: first.pattern.to_string(),
                        second: second.pattern.to_string(),
                    });
                }
            }
        }
        Ok(Self { bindings })
    }

    /// The library controller's bindings.
    pub fn library() -> Result<Self, RouteTableError> {
        use Operation::*;

        let declarations: [(Method, &str, Operation, &'static [ParamSpec]); 13] = [
            (Method::GET, "all", ListAll, NO_PARAMS),
            (Method::POST, "everything", ListAll, NO_PARAMS),
            (Method::PATCH, "all", ListAll, NO_PARAMS),
            (Method::OPTIONS, "all", ListAll, NO_PARAMS),
            (Method::GET, "", FetchByIndex, INDEX_FROM_QUERY),
            (Method::GET, "take", FetchByIndex, INDEX_FROM_QUERY),
            (Method::GET, "get", FetchByIndex, INDEX_FROM_QUERY),
            // The root pattern has no `index` variable, so this binding
            // always sees the parameter as absent.
            (Method::POST, "", FetchByIndex, INDEX_FROM_ROUTE),
            (Method::GET, "get/{index}", FetchByIndex, INDEX_FROM_ROUTE),
            (Method::POST, "bringBook", AddBook, BOOK_NAME_FROM_QUERY),
            (Method::POST, "sendBook", AddBook, BOOK_NAME_FROM_QUERY),
            (Method::PUT, "changeBook/{oldName}", ReplaceBook, REPLACE_PARAMS),
            // Reads `bookName` straight from the route values.
            (Method::DELETE, "deleteBook/{bookName}", DeleteBook, NO_PARAMS),
        ];

        let bindings = declarations
            .into_iter()
            .map(|(method, pattern, operation, params)| {
                RouteBinding::new(method, pattern, operation, params)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(bindings)
    }

    pub fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }

    /// Resolve a request path (relative to the controller base).
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let mut allowed = Vec::new();

        for binding in &self.bindings {
            let Some(values) = binding.pattern.matches(path) else {
                continue;
            };
            if binding.method == *method {
                return Resolution::Matched(RouteMatch { binding, values });
            }
            if !allowed.contains(&binding.method) {
                allowed.push(binding.method.clone());
            }
        }

        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed(allowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched<'a>(table: &'a RouteTable, method: Method, path: &str) -> RouteMatch<'a> {
        match table.resolve(&method, path) {
            Resolution::Matched(m) => m,
            other => panic!("expected match for {} {}, got {:?}", method, path, other),
        }
    }

    #[test]
    fn test_library_table_is_valid() {
        let table = RouteTable::library().unwrap();
        assert_eq!(table.bindings().len(), 13);
    }

    #[test]
    fn test_list_all_bindings() {
        let table = RouteTable::library().unwrap();
        for (method, path) in [
            (Method::GET, "all"),
            (Method::POST, "everything"),
            (Method::PATCH, "all"),
            (Method::OPTIONS, "all"),
        ] {
            assert_eq!(matched(&table, method, path).binding.operation, Operation::ListAll);
        }
    }

    #[test]
    fn test_same_path_different_methods() {
        let table = RouteTable::library().unwrap();

        let get_root = matched(&table, Method::GET, "");
        assert_eq!(get_root.binding.operation, Operation::FetchByIndex);
        assert_eq!(get_root.binding.params, INDEX_FROM_QUERY);

        let post_root = matched(&table, Method::POST, "");
        assert_eq!(post_root.binding.operation, Operation::FetchByIndex);
        assert_eq!(post_root.binding.params, INDEX_FROM_ROUTE);
        assert!(post_root.values.is_empty());
    }

    #[test]
    fn test_route_variable_bindings() {
        let table = RouteTable::library().unwrap();

        let m = matched(&table, Method::GET, "get/3");
        assert_eq!(m.binding.operation, Operation::FetchByIndex);
        assert_eq!(m.values.get("index"), Some("3"));

        let m = matched(&table, Method::PUT, "changeBook/Old");
        assert_eq!(m.binding.operation, Operation::ReplaceBook);
        assert_eq!(m.values.get("oldName"), Some("Old"));

        let m = matched(&table, Method::DELETE, "deleteBook/X");
        assert_eq!(m.binding.operation, Operation::DeleteBook);
        assert_eq!(m.values.get("bookName"), Some("X"));
    }

    #[test]
    fn test_method_not_allowed() {
        let table = RouteTable::library().unwrap();

        match table.resolve(&Method::DELETE, "all") {
            Resolution::MethodNotAllowed(methods) => {
                assert_eq!(methods, vec![Method::GET, Method::PATCH, Method::OPTIONS]);
            }
            other => panic!("unexpected resolution: {:?}", other),
        }

        match table.resolve(&Method::GET, "everything") {
            Resolution::MethodNotAllowed(methods) => assert_eq!(methods, vec![Method::POST]),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_not_found() {
        let table = RouteTable::library().unwrap();
        assert!(matches!(table.resolve(&Method::GET, "nothing"), Resolution::NotFound));
        assert!(matches!(table.resolve(&Method::GET, "get/1/2"), Resolution::NotFound));
        assert!(matches!(table.resolve(&Method::DELETE, "deleteBook"), Resolution::NotFound));
    }

    #[test]
    fn test_overlapping_bindings_rejected() {
        let bindings = vec![
            RouteBinding::new(Method::GET, "get/{index}", Operation::FetchByIndex, INDEX_FROM_ROUTE)
                .unwrap(),
            RouteBinding::new(Method::GET, "get/all", Operation::ListAll, NO_PARAMS).unwrap(),
        ];
        let err = RouteTable::new(bindings).unwrap_err();
        assert!(matches!(err, RouteTableError::Overlap { .. }));
    }

    #[test]
    fn test_same_pattern_different_methods_allowed() {
        let bindings = vec![
            RouteBinding::new(Method::GET, "all", Operation::ListAll, NO_PARAMS).unwrap(),
            RouteBinding::new(Method::PATCH, "all", Operation::ListAll, NO_PARAMS).unwrap(),
        ];
        assert!(RouteTable::new(bindings).is_ok());
    }

    #[test]
    fn test_bind_params() {
        let table = RouteTable::library().unwrap();
        let m = matched(&table, Method::PUT, "changeBook/A");

        let mut query = HashMap::new();
        query.insert("newName".to_string(), "B".to_string());
        query.insert("ignored".to_string(), "x".to_string());

        let params = m.binding.bind(&m.values, &query);
        assert_eq!(params.get("oldName"), Some("A"));
        assert_eq!(params.get("newName"), Some("B"));
        assert_eq!(params.get("ignored"), None);
    }

    #[test]
    fn test_bind_missing_route_variable() {
        let table = RouteTable::library().unwrap();
        let m = matched(&table, Method::POST, "");

        let mut query = HashMap::new();
        query.insert("index".to_string(), "2".to_string());

        // Route-sourced parameters never fall back to the query string.
        let params = m.binding.bind(&m.values, &query);
        assert_eq!(params.get("index"), None);
    }
}
