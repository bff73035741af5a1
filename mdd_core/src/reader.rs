use std::path::Path;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::WalkBuilder;

use crate::MddError;
use crate::MddResult;
use crate::RawDocument;
use crate::options::Encoding;
use crate::options::ParseOptions;

/// Traverse `dir`, apply the `filter` and `ignore` globs from `options` to
/// directory-relative paths, and yield each matching file's decoded text.
///
/// Traversal is sorted by file path so that the result order — and with it
/// the winner of any derived-key collision — is deterministic for a fixed
/// directory snapshot. `.gitignore` files and hidden-file rules are not
/// consulted: the only filtering is the caller's globs.
pub fn read_directory(dir: &Path, options: &ParseOptions) -> MddResult<Vec<RawDocument>> {
	if !dir.is_dir() {
		return Err(MddError::DirectoryRead {
			path: dir.display().to_string(),
			reason: "not a directory".to_string(),
		});
	}

	let filter = build_glob_set(std::slice::from_ref(&options.filter))?;
	let ignore_set = build_glob_set(&options.ignore)?;

	let walker = WalkBuilder::new(dir)
		.standard_filters(false)
		.follow_links(false)
		.sort_by_file_path(|a, b| a.cmp(b))
		.build();

	let mut documents = Vec::new();

	for entry in walker {
		let entry = entry.map_err(|error| MddError::DirectoryRead {
			path: dir.display().to_string(),
			reason: error.to_string(),
		})?;

		if !entry.file_type().is_some_and(|kind| kind.is_file()) {
			continue;
		}

		let Ok(relative) = entry.path().strip_prefix(dir) else {
			continue;
		};
		let relative = normalize_separators(relative);

		if !filter.is_match(&relative) {
			tracing::trace!(file = %relative, "skipped by filter");
			continue;
		}

		if !ignore_set.is_empty() && ignore_set.is_match(&relative) {
			tracing::trace!(file = %relative, "skipped by ignore pattern");
			continue;
		}

		let text = read_text(entry.path(), options.encoding)?;
		documents.push(RawDocument {
			source: relative,
			text,
		});
	}

	tracing::debug!(dir = %dir.display(), count = documents.len(), "read directory");

	Ok(documents)
}

/// Read and decode a single file per the configured encoding.
pub fn read_text(path: &Path, encoding: Encoding) -> MddResult<String> {
	let bytes = std::fs::read(path)?;

	match encoding {
		Encoding::Utf8 => String::from_utf8(bytes).map_err(|_| MddError::Encoding {
			path: path.display().to_string(),
		}),
		Encoding::Utf8Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
	}
}

/// Build a `GlobSet` from pattern strings, failing on the first invalid one.
pub fn build_glob_set(patterns: &[String]) -> MddResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();

	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|error| MddError::InvalidGlob {
			pattern: pattern.to_string(),
			reason: error.to_string(),
		})?;
		builder.add(glob);
	}

	builder.build().map_err(|error| MddError::InvalidGlob {
		pattern: patterns.join(", "),
		reason: error.to_string(),
	})
}

/// Relative paths use forward slashes in content-map keys on every platform.
fn normalize_separators(path: &Path) -> String {
	path.to_string_lossy().replace('\\', "/")
}
