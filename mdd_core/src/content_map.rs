use crate::ContentMap;
use crate::MddResult;
use crate::RawDocument;
use crate::options::ParseOptions;
use crate::pipeline::Pipeline;

/// Derive the content-map key for a directory-relative path.
///
/// Pure function of the path and two options: unless `dirnames` is set the
/// leading directory segments are stripped, and unless `extensions` is set
/// the trailing extension is stripped. Two files that derive the same key
/// overwrite one another in the map — an accepted collision policy, not an
/// error.
pub fn derive_key(relative_path: &str, extensions: bool, dirnames: bool) -> String {
	let (prefix, basename) = match relative_path.rsplit_once('/') {
		Some((dirs, base)) => (dirs, base),
		None => ("", relative_path),
	};

	let basename = if extensions {
		basename
	} else {
		strip_extension(basename)
	};

	if dirnames && !prefix.is_empty() {
		format!("{prefix}/{basename}")
	} else {
		basename.to_string()
	}
}

/// Strip the trailing extension from a file name. Dotfiles such as
/// `.gitignore` have no extension and are returned unchanged.
fn strip_extension(basename: &str) -> &str {
	match basename.rfind('.') {
		Some(0) | None => basename,
		Some(index) => &basename[..index],
	}
}

/// Fold the directory reader's output through the pipeline into a single
/// key-to-document mapping. Any pipeline failure aborts the whole build —
/// no partial map is returned.
pub fn build_content_map(
	documents: Vec<RawDocument>,
	pipeline: &Pipeline,
	options: &ParseOptions,
) -> MddResult<ContentMap> {
	let mut map = ContentMap::new();

	for raw in documents {
		let key = derive_key(&raw.source, options.extensions, options.dirnames);

		if map.contains_key(&key) {
			tracing::debug!(key = %key, source = %raw.source, "derived key collision, later file wins");
		}

		let document = pipeline.apply(raw)?;
		map.insert(key, document);
	}

	Ok(map)
}
