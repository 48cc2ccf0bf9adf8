#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]

#[macro_use]
extern crate alloc;

mod error;
pub use error::TreeError;

mod traits;
pub use traits::{Compare, First, FloatOrder, Greater, Identity, KeyOfValue, Less};

mod tree;
pub use tree::{Cursor, IntoIter, InvariantViolation, Iter, MapTree, Position, RbTree, SetTree};

mod set;
pub use set::{RbMultiSet, RbSet};

mod map;
pub use map::{RbMap, RbMultiMap};
