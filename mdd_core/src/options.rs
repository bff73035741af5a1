use std::sync::Arc;

use crate::Document;
use crate::MddResult;
use crate::frontmatter::Extractor;
use crate::frontmatter::YamlFrontmatter;
use crate::render::CommonmarkRenderer;
use crate::render::Renderer;

/// The default glob used to select documents in directory mode.
pub const DEFAULT_FILTER: &str = "**/*.md";

/// A caller-supplied transform applied to each document after extraction and
/// rendering. Failures raised here propagate to the caller unmodified; the
/// pipeline never catches or rewrites them. Use [`transform_fn`] to adapt a
/// plain closure.
pub trait DocumentTransform: Send + Sync {
	fn transform(&self, document: Document) -> MddResult<Document>;
}

/// Adapter returned by [`transform_fn`].
pub struct TransformFn<F>(F);

/// Adapt a closure into a [`DocumentTransform`].
pub fn transform_fn<F>(transform: F) -> TransformFn<F>
where
	F: Fn(Document) -> MddResult<Document> + Send + Sync,
{
	TransformFn(transform)
}

impl<F> DocumentTransform for TransformFn<F>
where
	F: Fn(Document) -> MddResult<Document> + Send + Sync,
{
	fn transform(&self, document: Document) -> MddResult<Document> {
		(self.0)(document)
	}
}

/// How raw file bytes are decoded into text.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Encoding {
	/// Strict UTF-8: invalid sequences fail with
	/// [`MddError::Encoding`](crate::MddError).
	#[default]
	Utf8,
	/// Lossy UTF-8: invalid sequences become U+FFFD replacement characters.
	Utf8Lossy,
}

/// Options recognized by every entry point of the file API.
///
/// Construction is a non-mutating merge: fields the caller sets override the
/// defaults field-by-field, typically via struct update syntax:
///
/// ```rust
/// use mdd_core::ParseOptions;
///
/// let options = ParseOptions {
/// 	original: true,
/// 	..ParseOptions::default()
/// };
/// ```
///
/// Options are constructed fresh per call and never cached or shared across
/// calls.
#[derive(Clone)]
pub struct ParseOptions {
	/// Renderer for body markup. Default: commonmark to HTML.
	pub md: Arc<dyn Renderer>,
	/// Frontmatter extractor. Default: YAML between `---` delimiters.
	pub frontmatter: Arc<dyn Extractor>,
	/// File decoding. Default: strict UTF-8.
	pub encoding: Encoding,
	/// Glob selecting which files to parse in directory mode.
	/// Default: `**/*.md`.
	pub filter: String,
	/// Globs excluding files in directory mode. Default: none.
	pub ignore: Vec<String>,
	/// Keep file extensions in content-map keys. Default: `false` (stripped).
	pub extensions: bool,
	/// Keep subdirectory prefixes in content-map keys. Default: `false`
	/// (stripped).
	pub dirnames: bool,
	/// Keep the pristine pre-render text in [`Document::orig`]. Default:
	/// `false` (discarded).
	pub original: bool,
	/// Transform applied to each document after rendering. Default: none.
	pub transform: Option<Arc<dyn DocumentTransform>>,
}

impl Default for ParseOptions {
	fn default() -> Self {
		Self {
			md: Arc::new(CommonmarkRenderer),
			frontmatter: Arc::new(YamlFrontmatter),
			encoding: Encoding::default(),
			filter: DEFAULT_FILTER.to_string(),
			ignore: Vec::new(),
			extensions: false,
			dirnames: false,
			original: false,
			transform: None,
		}
	}
}

impl std::fmt::Debug for ParseOptions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ParseOptions")
			.field("encoding", &self.encoding)
			.field("filter", &self.filter)
			.field("ignore", &self.ignore)
			.field("extensions", &self.extensions)
			.field("dirnames", &self.dirnames)
			.field("original", &self.original)
			.field("transform", &self.transform.is_some())
			.finish_non_exhaustive()
	}
}
