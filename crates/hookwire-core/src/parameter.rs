//! Dot-path parameter resolution over nested request data.
//!
//! Paths address values structurally: each dot-separated segment is a
//! mapping key or, when the current node is a sequence, a non-negative
//! index. Lookups fail soft -- a missing key, an unparsable index, an
//! out-of-range index or a scalar met mid-path all yield `None`, never an
//! error.

use serde_json::Value;

use hookwire_types::{Argument, ArgumentSource};

use crate::request::RequestContext;

/// Resolves a dot-delimited path against a value tree.
///
/// Returns `None` when the path does not fit the tree's actual shape.
pub fn get_parameter<'a>(path: &str, tree: &'a Value) -> Option<&'a Value> {
    match tree {
        Value::Array(items) => {
            let (head, rest) = match path.split_once('.') {
                Some((head, rest)) => (head, Some(rest)),
                None => (path, None),
            };
            let index: usize = head.parse().ok()?;
            let item = items.get(index)?;
            match rest {
                Some(rest) => get_parameter(rest, item),
                None => Some(item),
            }
        }
        Value::Object(map) => match path.split_once('.') {
            Some((head, rest)) => get_parameter(rest, map.get(head)?),
            None => map.get(path),
        },
        _ => None,
    }
}

/// Replaces the value at a dot-delimited path, in place.
///
/// Succeeds only when the final segment names a key that already exists in
/// the terminal mapping; it never inserts new keys, and the final segment
/// never addresses a sequence slot. Any traversal mismatch returns `false`.
pub fn replace_parameter(path: &str, tree: &mut Value, value: Value) -> bool {
    match tree {
        Value::Array(items) => {
            let Some((head, rest)) = path.split_once('.') else {
                return false;
            };
            let Ok(index) = head.parse::<usize>() else {
                return false;
            };
            match items.get_mut(index) {
                Some(item) => replace_parameter(rest, item, value),
                None => false,
            }
        }
        Value::Object(map) => match path.split_once('.') {
            Some((head, rest)) => match map.get_mut(head) {
                Some(item) => replace_parameter(rest, item, value),
                None => false,
            },
            None => match map.get_mut(path) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
        },
        _ => false,
    }
}

/// Resolves a path and stringifies the leaf.
///
/// Strings come back verbatim, numbers with their exact source text
/// (arbitrary precision, no float rounding), booleans as `true`/`false`,
/// null as `null`. Composite values get their compact JSON rendering.
pub fn extract_parameter_as_string(path: &str, tree: &Value) -> Option<String> {
    get_parameter(path, tree).map(stringify)
}

/// Resolves an argument's string value against one request.
///
/// Tree-backed sources delegate to [`extract_parameter_as_string`] on the
/// matching tree; `string` passes the name through verbatim; the
/// `entire-*` sources serialize the whole tree to JSON and only fail if
/// serialization does.
pub fn resolve_argument(argument: &Argument, request: &RequestContext) -> Option<String> {
    match argument.source {
        ArgumentSource::Header => extract_parameter_as_string(&argument.name, &request.headers),
        ArgumentSource::Query => extract_parameter_as_string(&argument.name, &request.query),
        ArgumentSource::Payload => extract_parameter_as_string(&argument.name, &request.payload),
        ArgumentSource::Literal => Some(argument.name.clone()),
        ArgumentSource::EntirePayload => serde_json::to_string(&request.payload).ok(),
        ArgumentSource::EntireQuery => serde_json::to_string(&request.query).ok(),
        ArgumentSource::EntireHeaders => serde_json::to_string(&request.headers).ok(),
    }
}

/// Canonical string form of a resolved leaf.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        composite => composite.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
