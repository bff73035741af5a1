use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A parsed document: extracted frontmatter data plus rendered body content.
///
/// `orig` carries the pristine pre-extraction file text and is only present
/// when the `original` option is set; it serializes as an absent field
/// otherwise so that inlined JSON carries no `orig` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
	/// Frontmatter data extracted from the document header.
	pub data: serde_json::Map<String, Value>,
	/// The rendered body content.
	pub content: String,
	/// The raw file text before extraction and rendering.
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub orig: Option<String>,
}

impl Document {
	/// A document with no frontmatter data whose body is the given raw text.
	/// This is the pipeline's starting state before any stage has run.
	pub fn from_raw(raw: String) -> Self {
		Self {
			data: serde_json::Map::new(),
			content: raw.clone(),
			orig: Some(raw),
		}
	}
}

/// The mapping from derived keys to parsed documents produced for an entire
/// directory.
///
/// A `BTreeMap` keeps iteration deterministic for a fixed directory
/// snapshot. Two files that derive the same key after extension/dirname
/// stripping overwrite one another — the later-processed file wins, which
/// with sorted traversal means the lexicographically greater relative path.
pub type ContentMap = BTreeMap<String, Document>;

/// A raw file buffer together with where it came from. Produced by the
/// directory reader or a direct file read, consumed exactly once by the
/// transform pipeline.
#[derive(Debug, Clone)]
pub struct RawDocument {
	/// Directory-relative path or absolute filename of the source file.
	pub source: String,
	/// The decoded file text.
	pub text: String,
}
