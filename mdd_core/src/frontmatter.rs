use serde_json::Value;

use crate::MddError;
use crate::MddResult;

/// The outcome of splitting a raw file into metadata and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
	/// Metadata parsed from the frontmatter header.
	pub data: serde_json::Map<String, Value>,
	/// The remaining body text after the header.
	pub body: String,
}

/// Splits raw file text into a metadata mapping and the remaining body.
///
/// Any conforming implementation is substitutable via
/// [`ParseOptions::frontmatter`](crate::ParseOptions). Use [`extract_fn`]
/// to adapt a plain closure.
pub trait Extractor: Send + Sync {
	fn extract(&self, input: &str) -> MddResult<Extracted>;
}

/// Adapter returned by [`extract_fn`].
pub struct ExtractFn<F>(F);

/// Adapt a closure into an [`Extractor`].
pub fn extract_fn<F>(extract: F) -> ExtractFn<F>
where
	F: Fn(&str) -> MddResult<Extracted> + Send + Sync,
{
	ExtractFn(extract)
}

impl<F> Extractor for ExtractFn<F>
where
	F: Fn(&str) -> MddResult<Extracted> + Send + Sync,
{
	fn extract(&self, input: &str) -> MddResult<Extracted> {
		(self.0)(input)
	}
}

/// The default extractor: a YAML header between `---` delimiters at the very
/// top of the file, in the style popularized by static site generators.
///
/// A file without an opening delimiter has no frontmatter — the whole text
/// is the body and `data` is empty. An opening delimiter without a closing
/// one, or a header that is not valid YAML, is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFrontmatter;

const DELIMITER: &str = "---";

impl Extractor for YamlFrontmatter {
	fn extract(&self, input: &str) -> MddResult<Extracted> {
		let Some(rest) = strip_open_delimiter(input) else {
			return Ok(Extracted {
				data: serde_json::Map::new(),
				body: input.to_string(),
			});
		};

		let Some((header, body)) = split_at_close_delimiter(rest) else {
			return Err(MddError::Frontmatter(
				"missing closing `---` delimiter".to_string(),
			));
		};

		let data = parse_header(header)?;

		Ok(Extracted {
			data,
			body: body.to_string(),
		})
	}
}

/// Strip the opening `---` line, returning the text after its newline.
/// Returns `None` when the file does not start with a frontmatter header.
fn strip_open_delimiter(input: &str) -> Option<&str> {
	let rest = input.strip_prefix(DELIMITER)?;
	// The delimiter must be alone on its line (allowing trailing CR).
	let rest = rest.strip_prefix('\r').unwrap_or(rest);
	rest.strip_prefix('\n')
}

/// Find the closing `---` line and split into (header, body-after-line).
fn split_at_close_delimiter(rest: &str) -> Option<(&str, &str)> {
	let mut offset = 0;

	for line in rest.split_inclusive('\n') {
		if line.trim_end_matches(['\r', '\n']) == DELIMITER {
			let header = &rest[..offset];
			let body = &rest[offset + line.len()..];
			return Some((header, body));
		}
		offset += line.len();
	}

	None
}

fn parse_header(header: &str) -> MddResult<serde_json::Map<String, Value>> {
	if header.trim().is_empty() {
		return Ok(serde_json::Map::new());
	}

	let value: Value = serde_yaml_ng::from_str(header)
		.map_err(|error| MddError::Frontmatter(error.to_string()))?;

	match value {
		Value::Object(map) => Ok(map),
		Value::Null => Ok(serde_json::Map::new()),
		other => Err(MddError::Frontmatter(format!(
			"expected a mapping at the top level, found {}",
			json_type_name(&other)
		))),
	}
}

fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "a sequence",
		Value::Object(_) => "a mapping",
	}
}
