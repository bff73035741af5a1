use std::path::Path;
use std::path::PathBuf;

use crate::MddError;
use crate::MddResult;
use crate::api::parse_dir_sync;
use crate::api::parse_file_sync;
use crate::reader::build_glob_set;
use crate::scanner::EntryPoint;
use crate::scanner::LiteralOptions;
use crate::scanner::Resolution;
use crate::scanner::scan_source;

/// The default module specifier the scanner recognizes in `require()`
/// expressions.
pub const DEFAULT_MODULE: &str = "mdd";

/// Configuration for the build-time inliner.
#[derive(Debug, Clone)]
pub struct InlineOptions {
	/// The module specifier whose bindings mark call sites for rewriting.
	pub module: String,
	/// File-name globs excluded from rewriting entirely. Excluded files
	/// pass through byte-identical. Default: `*.json`.
	pub exclude: Vec<String>,
	/// When set, a call site whose arguments cannot be statically resolved
	/// fails the whole file's rewrite instead of passing through untouched.
	pub fail_on_unresolved: bool,
}

impl Default for InlineOptions {
	fn default() -> Self {
		Self {
			module: DEFAULT_MODULE.to_string(),
			exclude: vec!["*.json".to_string()],
			fail_on_unresolved: false,
		}
	}
}

/// Rewrite one source file, replacing statically resolvable calls to the
/// four file-API entry points with their precomputed results.
///
/// `source_path` is the location of the file being rewritten; relative path
/// arguments at call sites resolve against its parent directory, not the
/// process working directory. The output is behaviorally equivalent to the input
/// but performs no filesystem access at the rewritten call sites.
///
/// Execution failures (missing directory, malformed document) abort the
/// rewrite for the whole file; no partial or fallback output is produced.
pub fn inline_source(
	source: &str,
	source_path: &Path,
	options: &InlineOptions,
) -> MddResult<String> {
	if is_excluded(source_path, &options.exclude)? {
		tracing::debug!(file = %source_path.display(), "excluded from inlining");
		return Ok(source.to_string());
	}

	let calls = scan_source(source, &options.module);
	if calls.is_empty() {
		return Ok(source.to_string());
	}

	let base_dir = source_path.parent().unwrap_or_else(|| Path::new("."));
	let mut output = String::with_capacity(source.len());
	let mut cursor = 0;

	for call in calls {
		let replacement = match &call.resolution {
			Resolution::Resolved {
				path,
				options: literals,
				callback,
			} => {
				let target = resolve_target(base_dir, path);
				let json = execute(call.entry, &target, literals)?;
				emit(source, callback.clone(), &json)
			}
			Resolution::Unresolved { reason } => {
				if options.fail_on_unresolved {
					return Err(MddError::UnresolvedCall {
						callee: call.entry.name().to_string(),
						offset: call.span.start,
						reason: reason.clone(),
					});
				}
				tracing::warn!(
					file = %source_path.display(),
					callee = call.entry.name(),
					offset = call.span.start,
					reason = %reason,
					"leaving call site untouched"
				);
				continue;
			}
		};

		output.push_str(&source[cursor..call.span.start]);
		output.push_str(&replacement);
		cursor = call.span.end;
	}

	output.push_str(&source[cursor..]);
	Ok(output)
}

fn is_excluded(source_path: &Path, exclude: &[String]) -> MddResult<bool> {
	let Some(name) = source_path.file_name() else {
		return Ok(false);
	};

	let set = build_glob_set(exclude)?;
	Ok(set.is_match(Path::new(name)))
}

fn resolve_target(base_dir: &Path, path: &str) -> PathBuf {
	let path = Path::new(path);
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		base_dir.join(path)
	}
}

/// Run the equivalent synchronous call eagerly and serialize the result.
/// Sync and async variants execute identically at rewrite time.
fn execute(entry: EntryPoint, target: &Path, literals: &LiteralOptions) -> MddResult<String> {
	let parse_options = literals.to_parse_options();

	let json = if entry.is_dir() {
		serde_json::to_string(&parse_dir_sync(target, &parse_options)?)?
	} else {
		serde_json::to_string(&parse_file_sync(target, &parse_options)?)?
	};

	Ok(json)
}

/// Emit the replacement for one call site. Sync variants become the bare
/// JSON literal. Async variants defer the original callback expression,
/// verbatim, to the next turn of the task queue, invoked with
/// `(null, result)` so the call site's asynchronous contract survives.
fn emit(source: &str, callback: Option<std::ops::Range<usize>>, json: &str) -> String {
	match callback {
		Some(span) => {
			let callback = &source[span];
			format!("process.nextTick(function(){{({callback})(null,{json})}})")
		}
		None => json.to_string(),
	}
}

/// Convenience wrapper: read `source_path`, rewrite it, and return the
/// transformed text. This is the shape a bundler's transform hook calls.
pub fn inline_file(source_path: &Path, options: &InlineOptions) -> MddResult<String> {
	let source = std::fs::read_to_string(source_path)?;
	inline_source(&source, source_path, options)
}
