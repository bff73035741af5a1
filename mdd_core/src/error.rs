use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum MddError {
	#[error(transparent)]
	#[diagnostic(code(mdd::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read directory `{path}`: {reason}")]
	#[diagnostic(
		code(mdd::directory_read),
		help("check that the directory exists and is readable")
	)]
	DirectoryRead { path: String, reason: String },

	#[error("malformed frontmatter: {0}")]
	#[diagnostic(
		code(mdd::frontmatter),
		help("frontmatter must be valid YAML between `---` delimiters at the top of the file")
	)]
	Frontmatter(String),

	#[error("failed to render markdown: {0}")]
	#[diagnostic(code(mdd::render))]
	Render(String),

	#[error("document transform failed: {0}")]
	#[diagnostic(code(mdd::transform))]
	Transform(String),

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(mdd::invalid_glob),
		help("`filter` and `ignore` accept globset syntax, e.g. `**/*.md`")
	)]
	InvalidGlob { pattern: String, reason: String },

	#[error("file `{path}` is not valid UTF-8")]
	#[diagnostic(
		code(mdd::encoding),
		help("use `Encoding::Utf8Lossy` to replace invalid sequences instead of failing")
	)]
	Encoding { path: String },

	#[error("failed to serialize inlined result: {0}")]
	#[diagnostic(code(mdd::json))]
	Json(#[from] serde_json::Error),

	#[error("cannot inline call to `{callee}` at offset {offset}: {reason}")]
	#[diagnostic(code(mdd::unresolved_call))]
	UnresolvedCall {
		callee: String,
		offset: usize,
		reason: String,
	},
}

pub type MddResult<T> = Result<T, MddError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
