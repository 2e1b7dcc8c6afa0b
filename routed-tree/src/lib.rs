#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod macros;

mod error;
pub use error::{Error, ErrorKind};

mod number;
pub use number::Number;

mod node;
pub use node::{Entry, Iter, Node};

mod router;
pub use router::{Access, Branch, DefaultKind, Factory, Route, Router, RouterBuilder, TreeKind};

mod segment;
pub use segment::Segment;

#[cfg(feature = "serde")]
mod serde_support;

mod trace;

mod value;
pub use value::{Value, ValueType};

// Key and string type used throughout the public API.
pub use smol_str::SmolStr;

// Support for the value! macro. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use indexmap::IndexMap;
    pub use std::rc::Rc;
}
