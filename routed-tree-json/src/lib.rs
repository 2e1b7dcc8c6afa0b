//! JSON text boundary for routed trees.
//!
//! Rendering is a pure function of the plain serialized form: a node is
//! first flattened through [`Node::serialize`] (route resolution applies,
//! so aliases, virtual keys, and computed routes all appear), then written
//! as JSON. Ingestion goes the other way, producing a [`Value`] suitable as
//! root contents for [`Router::root`](routed_tree::Router::root).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use core::fmt::{self, Display, Formatter};

use routed_tree::{Node, Value};

/// Error type for the JSON boundary.
#[derive(Debug)]
pub enum Error {
    /// Tree resolution failed while flattening a node.
    Tree(routed_tree::Error),
    /// JSON reading or writing failed.
    Json(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Tree(e) => write!(f, "tree resolution failed: {e}"),
            Error::Json(e) => write!(f, "json: {e}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Tree(e) => Some(e),
            Error::Json(e) => Some(e),
        }
    }
}

impl From<routed_tree::Error> for Error {
    fn from(e: routed_tree::Error) -> Self {
        Error::Tree(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// Render a value as compact JSON.
pub fn to_string(value: &Value) -> Result<String, Error> {
    Ok(serde_json::to_string(value)?)
}

/// Render a value as pretty-printed JSON.
pub fn to_string_pretty(value: &Value) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Flatten a node (applying its routing table) and render it as compact
/// JSON.
pub fn node_to_string(node: &Node) -> Result<String, Error> {
    to_string(&node.serialize()?)
}

/// Flatten a node (applying its routing table) and render it as
/// pretty-printed JSON.
pub fn node_to_string_pretty(node: &Node) -> Result<String, Error> {
    to_string_pretty(&node.serialize()?)
}

/// Parse JSON text into a value.
pub fn from_str(text: &str) -> Result<Value, Error> {
    Ok(serde_json::from_str(text)?)
}

/// Parse JSON bytes into a value.
pub fn from_slice(bytes: &[u8]) -> Result<Value, Error> {
    Ok(serde_json::from_slice(bytes)?)
}
