use std::path::Path;

use crate::ContentMap;
use crate::Document;
use crate::MddError;
use crate::MddResult;
use crate::RawDocument;
use crate::content_map::build_content_map;
use crate::options::ParseOptions;
use crate::pipeline::Pipeline;
use crate::reader::read_directory;
use crate::reader::read_text;

/// Parse every matching document under `dir` into a [`ContentMap`],
/// blocking the calling thread.
pub fn parse_dir_sync(dir: impl AsRef<Path>, options: &ParseOptions) -> MddResult<ContentMap> {
	let dir = dir.as_ref();
	let pipeline = Pipeline::new(options);
	let documents = read_directory(dir, options)?;

	build_content_map(documents, &pipeline, options)
}

/// Parse every matching document under `dir` into a [`ContentMap`].
///
/// Runs the blocking work on the tokio blocking pool and completes exactly
/// once with either the map or the error.
pub async fn parse_dir(dir: impl AsRef<Path>, options: &ParseOptions) -> MddResult<ContentMap> {
	let dir = dir.as_ref().to_path_buf();
	let options = options.clone();

	run_blocking(move || parse_dir_sync(&dir, &options)).await
}

/// Parse a single file into a [`Document`], blocking the calling thread.
///
/// The `filter` and `ignore` options are directory-mode concerns and are
/// not consulted here.
pub fn parse_file_sync(path: impl AsRef<Path>, options: &ParseOptions) -> MddResult<Document> {
	let path = path.as_ref();
	let pipeline = Pipeline::new(options);
	let text = read_text(path, options.encoding)?;
	let raw = RawDocument {
		source: path.display().to_string(),
		text,
	};

	pipeline.apply(raw)
}

/// Parse a single file into a [`Document`].
///
/// Runs the blocking work on the tokio blocking pool and completes exactly
/// once with either the document or the error.
pub async fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> MddResult<Document> {
	let path = path.as_ref().to_path_buf();
	let options = options.clone();

	run_blocking(move || parse_file_sync(&path, &options)).await
}

async fn run_blocking<T, F>(work: F) -> MddResult<T>
where
	T: Send + 'static,
	F: FnOnce() -> MddResult<T> + Send + 'static,
{
	match tokio::task::spawn_blocking(work).await {
		Ok(result) => result,
		Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
		Err(error) => Err(MddError::Io(std::io::Error::other(error.to_string()))),
	}
}
