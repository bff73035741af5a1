//! `mdd_core` is the core library for [mdd](https://github.com/ifiokjr/mdd).
//! It converts a directory tree (or single file) of markdown documents —
//! each an optional frontmatter header plus a markdown body — into a mapping
//! from derived keys to parsed documents, and provides the build-time
//! inliner that replaces runtime calls to that API inside bundled source
//! with their precomputed results.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Directory / file
//!   → Reader (sorted traversal, filter/ignore globs, decode)
//!   → Pipeline (extract frontmatter → render → strip orig → user transform)
//!   → Content map builder (key derivation, last-wins collisions)
//!   → ContentMap / Document
//! ```
//!
//! Independently, at build time:
//!
//! ```text
//! Source file
//!   → Scanner (require bindings, call sites, literal argument resolution)
//!   → Rewriter (execute sync API, splice JSON literal or deferred callback)
//!   → Rewritten source with no runtime filesystem access
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdd_core::ParseOptions;
//! use mdd_core::parse_dir_sync;
//! use std::path::Path;
//!
//! let contents = parse_dir_sync(Path::new("./posts"), &ParseOptions::default()).unwrap();
//! for (key, document) in &contents {
//! 	println!("{key}: {}", document.content);
//! }
//! ```

pub use api::*;
pub use content_map::*;
pub use document::*;
pub use error::*;
pub use frontmatter::*;
pub use options::*;
pub use pipeline::*;
pub use render::*;
pub use rewrite::*;
pub use scanner::*;

mod api;
mod content_map;
mod document;
mod error;
pub mod frontmatter;
pub mod options;
mod pipeline;
pub mod reader;
pub mod render;
mod rewrite;
pub mod scanner;

#[cfg(test)]
mod __tests;
