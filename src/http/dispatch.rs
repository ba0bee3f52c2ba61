//! Operation dispatch and response rendering.
//!
//! # Responsibilities
//! - Bind a matched route's parameters
//! - Invoke the catalog operation
//! - Map the outcome to a status code and body
//!
//! # Design Decisions
//! - Misses are normal outcomes encoded in the status (418 for fetch, 400 for
//!   delete), not errors
//! - Soft-success bodies (the joke, an empty replacement result) stay 200
//! - Only malformed or missing required input becomes a `DispatchError`

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::catalog::CatalogStore;
use crate::routing::{Operation, RouteMatch};

/// Body returned when a book is added without a name.
pub const JOKE: &str = "Это очень плохая шутка!";

/// Input that cannot be bound to an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("parameter `{name}` must be an integer, got `{value}`")]
    InvalidInteger { name: &'static str, value: String },

    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Response body of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Empty,
    Text(String),
    Titles(Vec<String>),
}

/// Status and body of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: ReplyBody,
}

impl Reply {
    fn ok(body: ReplyBody) -> Self {
        Self { status: StatusCode::OK, body }
    }

    fn empty(status: StatusCode) -> Self {
        Self { status, body: ReplyBody::Empty }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.body {
            ReplyBody::Empty => self.status.into_response(),
            ReplyBody::Text(text) => (self.status, text).into_response(),
            ReplyBody::Titles(titles) => (self.status, Json(titles)).into_response(),
        }
    }
}

/// Run the operation bound to `route` against `store`.
pub fn dispatch(
    store: &CatalogStore,
    route: &RouteMatch<'_>,
    query: &HashMap<String, String>,
) -> Result<Reply, DispatchError> {
    let params = route.binding.bind(&route.values, query);

    let reply = match route.binding.operation {
        Operation::ListAll => Reply::ok(ReplyBody::Titles(store.list_all())),

        Operation::FetchByIndex => {
            let index = parse_index("index", params.get("index"))?;
            match store.get_at(index) {
                Some(title) => Reply::ok(ReplyBody::Text(title)),
                None => Reply::empty(StatusCode::IM_A_TEAPOT),
            }
        }

        Operation::AddBook => match params.get("bookName") {
            None | Some("") => Reply::ok(ReplyBody::Text(JOKE.to_string())),
            Some(name) => {
                store.add(name);
                tracing::debug!(title = %name, "Book added");
                Reply::empty(StatusCode::OK)
            }
        },

        Operation::ReplaceBook => {
            let old = params.get("oldName").unwrap_or_default();
            // An empty query value counts as absent.
            let new = match params.get("newName") {
                None | Some("") => return Err(DispatchError::MissingParameter("newName")),
                Some(new) => new,
            };
            let (replaced, body) = store.replace_first_match(old, new);
            tracing::debug!(old = %old, new = %new, replaced, "Replace requested");
            Reply::ok(ReplyBody::Text(body))
        }

        Operation::DeleteBook => {
            // Read from the route values directly; a binding without the
            // capture deletes nothing.
            let name = route.values.get("bookName").unwrap_or_default();
            if store.remove_first_match(name) {
                tracing::debug!(title = %name, "Book removed");
                Reply::empty(StatusCode::OK)
            } else {
                Reply::empty(StatusCode::BAD_REQUEST)
            }
        }
    };

    Ok(reply)
}

/// An absent index binds to 0, the integer default.
fn parse_index(name: &'static str, raw: Option<&str>) -> Result<i64, DispatchError> {
    match raw {
        None => Ok(0),
        Some(value) => value.trim().parse().map_err(|_| DispatchError::InvalidInteger {
            name,
            value: value.to_string(),
        }),
    }
}
