//! vjson-core: tagged value representation, arena storage, and SIMD scan
//! primitives shared by the `vjson` parser and serializer.
//!
//! This crate has no knowledge of JSON grammar. It provides:
//!
//! - [`node`]: the fixed 24-byte tagged [`node::Node`] record.
//! - [`arena`]: [`arena::NodeArena`] and [`arena::StringArena`], the two
//!   bump-allocated regions a document owns.
//! - [`simd`] / [`dispatch`]: scalar and vector-tier byte-classification
//!   primitives, and the process-wide dispatch table that selects among
//!   them.
//! - [`error`]: the parse/stringify error taxonomy and thread-local
//!   last-error record.

pub mod arena;
pub mod dispatch;
pub mod error;
pub mod node;
pub mod simd;

pub use arena::{NodeArena, NodeRef, StringArena, StringRef};
pub use error::{ErrorKind, ParseError};
pub use node::{Node, Tag, MAX_INT60, MIN_INT60};
