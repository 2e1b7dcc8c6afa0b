//! Error types for tree access.

use core::fmt::{self, Display, Formatter};

use smol_str::SmolStr;

use crate::segment::{self, Segment};
use crate::value::Value;

/// Error type for tree access and enumeration.
#[derive(Debug)]
pub struct Error {
    /// The specific kind of error
    kind: ErrorKind,
}

/// Specific error kinds for tree access.
#[derive(Debug)]
pub enum ErrorKind {
    /// Content traversal tried to index into a non-indexable value, or a
    /// sequence was indexed with a non-numeric key.
    Indexing {
        /// The segment that failed to resolve
        segment: Segment,
        /// A rendering of the container being indexed
        container: String,
        /// The full key tuple that was requested
        keys: Box<[Segment]>,
    },
    /// `keys()` or a membership check was requested on a node that does not
    /// wrap a map.
    NotMapLike {
        /// The full route of the offending node
        route: Box<[Segment]>,
    },
    /// Symbolic dispatch named an operation the node's kind does not
    /// implement.
    UnknownOperation {
        /// The operation name that failed to dispatch
        name: SmolStr,
    },
    /// An upward walk required a parent node that has already been released.
    Detached,
}

impl Error {
    /// The kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Whether this is a content-indexing failure.
    pub fn is_indexing(&self) -> bool {
        matches!(self.kind, ErrorKind::Indexing { .. })
    }

    /// Whether this is a usage failure (wrong structural kind, unknown
    /// operation, released parent).
    pub fn is_usage(&self) -> bool {
        !self.is_indexing()
    }

    pub(crate) fn indexing(segment: &Segment, container: &Value, keys: &[Segment]) -> Self {
        Error {
            kind: ErrorKind::Indexing {
                segment: segment.clone(),
                container: clip(format!("{container:?}")),
                keys: keys.into(),
            },
        }
    }

    pub(crate) fn not_map_like(route: &[Segment]) -> Self {
        Error {
            kind: ErrorKind::NotMapLike { route: route.into() },
        }
    }

    /// An unknown-operation error, for [`TreeKind::invoke`] implementations
    /// to return on operation names they do not recognize.
    ///
    /// [`TreeKind::invoke`]: crate::TreeKind::invoke
    pub fn unknown_operation(name: &str) -> Self {
        Error {
            kind: ErrorKind::UnknownOperation {
                name: SmolStr::new(name),
            },
        }
    }

    pub(crate) fn detached() -> Self {
        Error {
            kind: ErrorKind::Detached,
        }
    }
}

/// Bound the container rendering so deep trees keep error messages readable.
fn clip(mut text: String) -> String {
    const MAX: usize = 160;
    if text.len() > MAX {
        let mut end = MAX;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push('…');
    }
    text
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Indexing {
                segment,
                container,
                keys,
            } => write!(
                f,
                "could not access key `{segment}` in {container} (keys requested: `{}`)",
                segment::join(keys)
            ),
            ErrorKind::NotMapLike { route } => write!(
                f,
                "cannot enumerate keys at `/{}`: the node does not wrap a map",
                segment::join(route)
            ),
            ErrorKind::UnknownOperation { name } => {
                write!(f, "tree kind has no operation named `{name}`")
            }
            ErrorKind::Detached => {
                f.write_str("parent node was released; cannot walk to the routing root")
            }
        }
    }
}

impl core::error::Error for Error {}
